// ABOUTME: Fixed-shape revision status keyed by derived condition names.
// ABOUTME: Always seeded with the four required conditions before merging.

use indexmap::IndexMap;

use super::condition::{ConditionKind, ConditionStatus, RawCondition, condition_key};

/// Status of every condition reported for a revision.
///
/// The four required kinds are always present, in the order of
/// [`ConditionKind::REQUIRED`]; any other reported condition follows in the
/// order it first appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionStatus {
    conditions: IndexMap<String, ConditionStatus>,
}

impl RevisionStatus {
    /// Normalize raw conditions. Later entries for the same key win.
    pub fn from_conditions(raw: &[RawCondition]) -> Self {
        let mut status = Self::default();
        for condition in raw {
            status.conditions.insert(
                condition_key(&condition.condition_type),
                ConditionStatus::from(condition),
            );
        }
        status
    }

    /// Status of a required condition.
    pub fn condition(&self, kind: ConditionKind) -> &ConditionStatus {
        // Seeded in Default and never removed.
        &self.conditions[kind.key()]
    }

    /// Status of any condition by key, including unknown ones.
    pub fn get(&self, key: &str) -> Option<&ConditionStatus> {
        self.conditions.get(key)
    }

    /// Iterate conditions in status order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConditionStatus)> {
        self.conditions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl Default for RevisionStatus {
    fn default() -> Self {
        let conditions = ConditionKind::REQUIRED
            .into_iter()
            .map(|kind| (kind.key().to_string(), ConditionStatus::unsatisfied()))
            .collect();
        Self { conditions }
    }
}
