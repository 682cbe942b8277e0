// ABOUTME: Decides whether a revision succeeded, failed fast, or is still pending.
// ABOUTME: Also renders the one-line status summary logged on each poll.

use std::fmt;

use crate::status::{ConditionKind, RevisionStatus};

/// Reason prefix reported when the workload process exited.
pub const EXIT_CODE_PREFIX: &str = "ExitCode";

/// Result of evaluating one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Not done yet; poll again.
    Pending,
    /// Every required condition is satisfied.
    Succeeded,
    /// A condition reports an unrecoverable exit.
    FailedFast {
        kind: ConditionKind,
        reason: String,
        message: String,
    },
    /// The deadline passed while still pending.
    TimedOut { revision: String },
}

impl PollOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollOutcome::Pending)
    }
}

impl fmt::Display for PollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollOutcome::Pending => f.write_str("pending"),
            PollOutcome::Succeeded => f.write_str("succeeded"),
            PollOutcome::FailedFast { kind, reason, .. } => {
                write!(f, "failed ({kind}: {reason})")
            }
            PollOutcome::TimedOut { revision } => write!(f, "timed out waiting for {revision}"),
        }
    }
}

/// True when all required conditions are satisfied.
pub fn is_complete(status: &RevisionStatus) -> bool {
    ConditionKind::REQUIRED
        .iter()
        .all(|kind| status.condition(*kind).satisfied)
}

/// Classify a revision status.
pub fn evaluate(status: &RevisionStatus) -> PollOutcome {
    if is_complete(status) {
        return PollOutcome::Succeeded;
    }

    // Satisfied conditions are scanned too: any ExitCode reason is fatal.
    for kind in ConditionKind::REQUIRED {
        let condition = status.condition(kind);
        if let Some(reason) = &condition.reason
            && reason.starts_with(EXIT_CODE_PREFIX)
        {
            return PollOutcome::FailedFast {
                kind,
                reason: reason.clone(),
                message: condition.message.clone().unwrap_or_default(),
            };
        }
    }

    PollOutcome::Pending
}

/// Render `"<complete> (key=<bool>, ...)"` in status order.
pub fn summary(status: &RevisionStatus) -> String {
    let values = status
        .iter()
        .map(|(key, condition)| format!("{key}={}", condition.satisfied))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} ({values})", is_complete(status))
}
