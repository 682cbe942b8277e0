// ABOUTME: Condition kinds, raw API conditions, and normalized condition status.
// ABOUTME: Includes the first-letter key derivation used to key conditions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four conditions a revision must satisfy to be considered complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    Active,
    Ready,
    ContainerHealthy,
    ResourcesAvailable,
}

impl ConditionKind {
    /// Required kinds in evaluation order.
    pub const REQUIRED: [ConditionKind; 4] = [
        ConditionKind::Active,
        ConditionKind::Ready,
        ConditionKind::ContainerHealthy,
        ConditionKind::ResourcesAvailable,
    ];

    /// Key under which this kind is stored in a [`RevisionStatus`](super::RevisionStatus).
    pub fn key(&self) -> &'static str {
        match self {
            ConditionKind::Active => "active",
            ConditionKind::Ready => "ready",
            ConditionKind::ContainerHealthy => "containerHealthy",
            ConditionKind::ResourcesAvailable => "resourcesAvailable",
        }
    }

    /// Look up a required kind by its key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::REQUIRED.into_iter().find(|kind| kind.key() == key)
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A condition as returned by the describe command.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCondition {
    #[serde(rename = "type")]
    pub condition_type: String,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Normalized state of a single condition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionStatus {
    pub satisfied: bool,
    pub last_transition_time: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub message: Option<String>,
}

impl ConditionStatus {
    /// Status for a condition that has not been reported yet.
    pub fn unsatisfied() -> Self {
        Self::default()
    }
}

impl From<&RawCondition> for ConditionStatus {
    fn from(raw: &RawCondition) -> Self {
        ConditionStatus {
            satisfied: raw.status.as_deref() == Some("True"),
            last_transition_time: raw
                .last_transition_time
                .as_deref()
                .and_then(parse_transition_time),
            reason: non_empty(raw.reason.as_deref()),
            message: non_empty(raw.message.as_deref()),
        }
    }
}

/// RFC 3339 timestamps only; anything else is treated as unknown.
fn parse_transition_time(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|time| time.with_timezone(&Utc))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Derive the status key for a condition type.
///
/// Only the first character is lower-cased; the rest is kept verbatim, so
/// `ContainerHealthy` becomes `containerHealthy` and `URLReady` becomes
/// `uRLReady`.
pub fn condition_key(condition_type: &str) -> String {
    let mut chars = condition_type.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
