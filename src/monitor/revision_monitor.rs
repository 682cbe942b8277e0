// ABOUTME: Generic revision monitor parameterized by state marker.
// ABOUTME: Holds the deploy invocation and wait settings shared by all states.

use std::time::Duration;

use crate::config::WaitConfig;

use super::state::{Completed, NotStarted, Polling};

/// Outcome of the deploy command the monitor is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployResult {
    pub exit_status: i32,
    pub transcript: String,
}

impl DeployResult {
    pub fn new(exit_status: i32, transcript: impl Into<String>) -> Self {
        Self {
            exit_status,
            transcript: transcript.into(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.exit_status == 0
    }
}

/// Summary of a successful monitoring invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorReport {
    /// Revision that became ready; `None` when the deploy needed no wait.
    pub revision: Option<String>,
    pub polls: u32,
    pub elapsed: Duration,
}

impl MonitorReport {
    /// Report for a deploy that exited cleanly.
    pub fn skipped() -> Self {
        Self {
            revision: None,
            polls: 0,
            elapsed: Duration::ZERO,
        }
    }
}

/// A monitoring run, parameterized by its current state.
#[derive(Debug)]
pub struct Monitor<S> {
    pub(crate) config: WaitConfig,
    pub(crate) invocation_args: Vec<String>,
    pub(crate) state: S,
}

impl Monitor<NotStarted> {
    /// Create a monitor for a deploy run with `invocation_args`.
    pub fn new(config: WaitConfig, invocation_args: Vec<String>) -> Self {
        Monitor {
            config,
            invocation_args,
            state: NotStarted,
        }
    }
}

impl<S> Monitor<S> {
    pub fn config(&self) -> &WaitConfig {
        &self.config
    }

    /// Arguments of the original deploy invocation.
    pub fn invocation_args(&self) -> &[String] {
        &self.invocation_args
    }
}

impl Monitor<Polling> {
    /// Revision being watched.
    pub fn revision(&self) -> &str {
        self.state.revision()
    }

    /// Status polls performed so far.
    pub fn polls(&self) -> u32 {
        self.state.polls
    }
}

impl Monitor<Completed> {
    pub fn revision(&self) -> &str {
        self.state.revision()
    }

    /// Terminal: produce the report.
    pub fn finish(self) -> MonitorReport {
        MonitorReport {
            revision: Some(self.state.revision),
            polls: self.state.polls,
            elapsed: self.state.elapsed,
        }
    }
}
