// ABOUTME: Monitor state types for the type state pattern.
// ABOUTME: Each state carries the data that exists only once it is reached.

use std::time::Duration;
use tokio::time::Instant;

/// Initial state: platform not yet checked, revision unknown.
/// Available actions: `target()`
#[derive(Debug, Clone, Copy, Default)]
pub struct NotStarted;

/// Polling: revision known, deadline running.
/// Available actions: `poll()`, `run()`
#[derive(Debug, Clone)]
pub struct Polling {
    pub(crate) revision: String,
    pub(crate) started: Instant,
    pub(crate) polls: u32,
}

/// Completed: every required condition was satisfied.
/// Available actions: `finish()`
#[derive(Debug, Clone)]
pub struct Completed {
    pub(crate) revision: String,
    pub(crate) polls: u32,
    pub(crate) elapsed: Duration,
}

impl Polling {
    pub fn revision(&self) -> &str {
        &self.revision
    }
}

impl Completed {
    pub fn revision(&self) -> &str {
        &self.revision
    }
}
