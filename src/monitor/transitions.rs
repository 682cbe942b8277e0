// ABOUTME: State transition methods for revision monitoring.
// ABOUTME: Resolves the target revision, then polls until ready, failed, or out of time.

use std::time::Duration;

use crate::classify::{RevisionLookup, find_revision};
use crate::evaluate::{PollOutcome, evaluate, summary};
use crate::fetch::fetch_status;
use crate::runner::{Clock, CommandRunner};

use super::error::MonitorError;
use super::revision_monitor::{DeployResult, Monitor, MonitorReport};
use super::state::{Completed, NotStarted, Polling};

// =============================================================================
// NotStarted -> Polling
// =============================================================================

impl Monitor<NotStarted> {
    /// Fail unless the deploy ran against the self-managed platform.
    pub fn check_platform(&self) -> Result<(), MonitorError> {
        let flag = self.config.platform_flag();
        if self.invocation_args.iter().any(|arg| *arg == flag) {
            Ok(())
        } else {
            Err(MonitorError::UnsupportedPlatform {
                required: self.config.platform.clone(),
            })
        }
    }

    /// Resolve the revision a failed deploy targeted and start the clock.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedPlatform` before looking at the transcript, then
    /// any classification or lookup failure.
    #[must_use = "monitor state must be used"]
    pub async fn target<C: Clock + ?Sized>(
        self,
        transcript: &str,
        lookup: &dyn RevisionLookup,
        clock: &C,
    ) -> Result<Monitor<Polling>, MonitorError> {
        self.check_platform()?;

        let revision = find_revision(
            transcript,
            self.config.namespace.as_deref(),
            self.config.cluster.as_deref(),
            lookup,
        )
        .await?;

        tracing::info!("Waiting for revision \"{revision}\" to become active...");

        Ok(Monitor {
            config: self.config,
            invocation_args: self.invocation_args,
            state: Polling {
                revision,
                started: clock.now(),
                polls: 0,
            },
        })
    }
}

// =============================================================================
// Polling -> Completed
// =============================================================================

impl Monitor<Polling> {
    fn elapsed<C: Clock + ?Sized>(&self, clock: &C) -> Duration {
        clock.now().saturating_duration_since(self.state.started)
    }

    /// Whether sleeping another interval would run past the timeout.
    ///
    /// A timeout shorter than the interval is reached before the first
    /// fetch, so such a run times out after zero polls.
    pub fn deadline_reached(&self, elapsed: Duration) -> bool {
        elapsed.saturating_add(self.config.interval) > self.config.timeout
    }

    /// Run one iteration: deadline check, sleep, fetch, evaluate.
    ///
    /// Returns `TimedOut` without sleeping or fetching once the deadline is
    /// reached.
    ///
    /// # Errors
    ///
    /// Fetch and decode failures abort; they are not retried.
    pub async fn poll<R, C>(&mut self, runner: &R, clock: &C) -> Result<PollOutcome, MonitorError>
    where
        R: CommandRunner + ?Sized,
        C: Clock + ?Sized,
    {
        if self.deadline_reached(self.elapsed(clock)) {
            return Ok(PollOutcome::TimedOut {
                revision: self.state.revision.clone(),
            });
        }

        clock.sleep(self.config.interval).await;

        let status = fetch_status(runner, &self.state.revision, &self.invocation_args).await?;
        self.state.polls += 1;

        let outcome = evaluate(&status);
        tracing::info!("Deploy status is: {}", summary(&status));
        Ok(outcome)
    }

    /// Poll until the revision is ready.
    ///
    /// # Errors
    ///
    /// Returns `FailFast` as soon as a condition reports an exit code,
    /// `Timeout` once the deadline passes, or the first fetch failure.
    #[must_use = "monitor state must be used"]
    pub async fn run<R, C>(mut self, runner: &R, clock: &C) -> Result<Monitor<Completed>, MonitorError>
    where
        R: CommandRunner + ?Sized,
        C: Clock + ?Sized,
    {
        loop {
            match self.poll(runner, clock).await? {
                PollOutcome::Pending => continue,
                PollOutcome::Succeeded => {
                    let elapsed = self.elapsed(clock);
                    return Ok(Monitor {
                        config: self.config,
                        invocation_args: self.invocation_args,
                        state: Completed {
                            revision: self.state.revision,
                            polls: self.state.polls,
                            elapsed,
                        },
                    });
                }
                PollOutcome::FailedFast {
                    kind,
                    reason,
                    message,
                } => {
                    return Err(MonitorError::FailFast {
                        kind,
                        reason,
                        message,
                    });
                }
                PollOutcome::TimedOut { revision } => {
                    return Err(MonitorError::Timeout {
                        revision,
                        elapsed: self.elapsed(clock),
                    });
                }
            }
        }
    }
}

/// Wait for the revision targeted by a deploy to become ready.
///
/// A deploy that exited zero needs no wait and returns immediately without
/// running any command.
pub async fn wait_for_revision<R, C>(
    result: &DeployResult,
    monitor: Monitor<NotStarted>,
    runner: &R,
    clock: &C,
    lookup: &dyn RevisionLookup,
) -> Result<MonitorReport, MonitorError>
where
    R: CommandRunner + ?Sized,
    C: Clock + ?Sized,
{
    if result.succeeded() {
        tracing::debug!("deploy exited cleanly, nothing to wait for");
        return Ok(MonitorReport::skipped());
    }

    let completed = monitor
        .target(&result.transcript, lookup, clock)
        .await?
        .run(runner, clock)
        .await?;

    tracing::info!(
        "Revision \"{}\" is ready after {} poll(s)",
        completed.revision(),
        completed.state.polls
    );
    Ok(completed.finish())
}
