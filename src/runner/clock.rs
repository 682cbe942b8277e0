// ABOUTME: Clock abstraction used by the poll loop for timing and sleeping.
// ABOUTME: The tokio implementation honours paused test time.

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

/// Time source and sleep primitive.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// Clock backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
