// ABOUTME: Error types for revision monitoring.
// ABOUTME: Every variant is terminal for a monitoring invocation.

use std::time::Duration;

use crate::runner::CommandError;
use crate::status::ConditionKind;

/// Errors that end a monitoring invocation.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// The deploy targeted a platform whose revisions expose no status.
    #[error("wait is not supported for managed Cloud Run (requires --platform={required})")]
    UnsupportedPlatform { required: String },

    /// The deploy transcript matched no known failure pattern.
    #[error("deploy failed for unknown reasons")]
    UnclassifiableFailure,

    /// The latest-revision lookup failed.
    #[error("failed to look up latest revision for \"{namespace}\": {source}")]
    RevisionLookup {
        namespace: String,
        #[source]
        source: CommandError,
    },

    /// The describe command could not be run or exited non-zero.
    #[error("failed to describe revision \"{revision}\": {source}")]
    StatusFetch {
        revision: String,
        #[source]
        source: CommandError,
    },

    /// The describe command output was not the expected JSON.
    #[error("Invalid JSON: Failed to load status for revision \"{revision}\". Reason: {reason}")]
    StatusDecode { revision: String, reason: String },

    /// A condition reported that the workload process exited.
    #[error("Revision failed \"{kind}\" condition with reason: {reason}\n{message}")]
    FailFast {
        kind: ConditionKind,
        reason: String,
        message: String,
    },

    /// The revision was still pending when the deadline passed.
    #[error("timed out after {}s waiting for revision \"{revision}\"", .elapsed.as_secs())]
    Timeout { revision: String, elapsed: Duration },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorErrorKind {
    UnsupportedPlatform,
    UnclassifiableFailure,
    RevisionLookup,
    StatusFetch,
    StatusDecode,
    FailFast,
    Timeout,
}

impl MonitorError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> MonitorErrorKind {
        match self {
            MonitorError::UnsupportedPlatform { .. } => MonitorErrorKind::UnsupportedPlatform,
            MonitorError::UnclassifiableFailure => MonitorErrorKind::UnclassifiableFailure,
            MonitorError::RevisionLookup { .. } => MonitorErrorKind::RevisionLookup,
            MonitorError::StatusFetch { .. } => MonitorErrorKind::StatusFetch,
            MonitorError::StatusDecode { .. } => MonitorErrorKind::StatusDecode,
            MonitorError::FailFast { .. } => MonitorErrorKind::FailFast,
            MonitorError::Timeout { .. } => MonitorErrorKind::Timeout,
        }
    }

    /// Name of the revision this error concerns, when known.
    pub fn revision(&self) -> Option<&str> {
        match self {
            MonitorError::StatusFetch { revision, .. }
            | MonitorError::StatusDecode { revision, .. }
            | MonitorError::Timeout { revision, .. } => Some(revision),
            _ => None,
        }
    }
}
