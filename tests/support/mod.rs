// ABOUTME: Test support utilities.
// ABOUTME: Provides scripted command runners and revision lookups for integration tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use revwatch::classify::RevisionLookup;
use revwatch::runner::{CommandError, CommandRunner};
use std::collections::VecDeque;
use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter =
            EnvFilter::from_default_env().add_directive("revwatch=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// A command invocation recorded by [`ScriptedRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub program: String,
    pub args: Vec<String>,
}

/// Runner that replays canned responses and records every call.
///
/// Once the script is exhausted the last response repeats.
pub struct ScriptedRunner {
    responses: Mutex<VecDeque<Result<String, CommandError>>>,
    last: Mutex<Option<Result<String, CommandError>>>,
    calls: Mutex<Vec<Call>>,
}

#[allow(dead_code)]
impl ScriptedRunner {
    pub fn new(responses: Vec<Result<String, CommandError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            last: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Runner that always prints `stdout`.
    pub fn always(stdout: impl Into<String>) -> Self {
        Self::new(vec![Ok(stdout.into())])
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn execute(
        &self,
        program: &str,
        args: &[String],
        on_stdout: &mut (dyn for<'c> FnMut(&'c [u8]) + Send),
    ) -> Result<(), CommandError> {
        self.calls.lock().push(Call {
            program: program.to_string(),
            args: args.to_vec(),
        });

        let response = {
            let mut responses = self.responses.lock();
            let mut last = self.last.lock();
            match responses.pop_front() {
                Some(response) => {
                    *last = Some(response.clone());
                    response
                }
                None => last.clone().unwrap_or_else(|| Ok(String::new())),
            }
        };

        let stdout = response?;
        // Deliver in two chunks to exercise accumulation.
        let split = stdout.len() / 2;
        let (head, tail) = stdout.as_bytes().split_at(split);
        on_stdout(head);
        on_stdout(tail);
        Ok(())
    }
}

/// Lookup returning a fixed answer and counting calls.
pub struct StaticLookup {
    answer: Result<String, CommandError>,
    calls: Mutex<Vec<(String, Option<String>)>>,
}

#[allow(dead_code)]
impl StaticLookup {
    pub fn new(answer: Result<String, CommandError>) -> Self {
        Self {
            answer,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn returning(revision: &str) -> Self {
        Self::new(Ok(revision.to_string()))
    }

    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl RevisionLookup for StaticLookup {
    async fn latest_revision(
        &self,
        namespace: &str,
        cluster: Option<&str>,
    ) -> Result<String, CommandError> {
        self.calls
            .lock()
            .push((namespace.to_string(), cluster.map(str::to_string)));
        self.answer.clone()
    }
}

/// Describe output with the given `(type, status, reason)` conditions.
#[allow(dead_code)]
pub fn describe_json(conditions: &[(&str, &str, Option<&str>)]) -> String {
    let conditions: Vec<serde_json::Value> = conditions
        .iter()
        .map(|(condition_type, status, reason)| {
            let mut condition = serde_json::json!({
                "type": condition_type,
                "status": status,
                "lastTransitionTime": "2024-03-01T12:00:00Z",
            });
            if let Some(reason) = reason {
                condition["reason"] = serde_json::json!(reason);
                condition["message"] = serde_json::json!(format!("{condition_type}: {reason}"));
            }
            condition
        })
        .collect();
    serde_json::json!({ "status": { "conditions": conditions } }).to_string()
}

/// Describe output for a revision whose required conditions are all true.
#[allow(dead_code)]
pub fn ready_json() -> String {
    describe_json(&[
        ("Active", "True", None),
        ("Ready", "True", None),
        ("ContainerHealthy", "True", None),
        ("ResourcesAvailable", "True", None),
    ])
}

/// Describe output for a revision still rolling out.
#[allow(dead_code)]
pub fn pending_json() -> String {
    describe_json(&[
        ("Active", "True", None),
        ("Ready", "Unknown", Some("Deploying")),
        ("ContainerHealthy", "True", None),
        ("ResourcesAvailable", "False", Some("Provisioning")),
    ])
}

#[allow(dead_code)]
pub fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
