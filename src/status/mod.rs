// ABOUTME: Revision status model built from raw describe-command conditions.
// ABOUTME: Normalizes heterogeneous condition lists into a fixed-shape status record.

mod condition;
mod revision;

pub use condition::{ConditionKind, ConditionStatus, RawCondition, condition_key};
pub use revision::RevisionStatus;
