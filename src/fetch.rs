// ABOUTME: Fetches live revision status by running the describe command.
// ABOUTME: Separates command failures from malformed describe output.

use serde::Deserialize;

use crate::monitor::MonitorError;
use crate::runner::CommandRunner;
use crate::status::{RawCondition, RevisionStatus};

/// Program used to describe revisions.
pub const DESCRIBE_PROGRAM: &str = "gcloud";

/// Invocation flags forwarded to the describe command, in order.
pub const FORWARDED_FLAGS: [&str; 5] = [
    "--project=",
    "--platform=",
    "--cluster=",
    "--cluster-location=",
    "--namespace=",
];

#[derive(Debug, Deserialize)]
struct DescribeResponse {
    status: DescribeStatus,
}

#[derive(Debug, Deserialize)]
struct DescribeStatus {
    conditions: Vec<RawCondition>,
}

/// First argument starting with `prefix`, if any.
pub fn find_flag<'a>(args: &'a [String], prefix: &str) -> Option<&'a str> {
    args.iter()
        .map(String::as_str)
        .find(|arg| arg.starts_with(prefix))
}

/// Build the describe arguments for `revision`.
///
/// Flags missing from the invocation are left out rather than passed empty.
pub fn describe_args(revision: &str, invocation_args: &[String]) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        "revisions".to_string(),
        "describe".to_string(),
        revision.to_string(),
    ];
    args.extend(
        FORWARDED_FLAGS
            .iter()
            .filter_map(|prefix| find_flag(invocation_args, prefix))
            .map(str::to_string),
    );
    args.push("--format=json".to_string());
    args
}

/// Decode describe-command output into a revision status.
pub fn parse_status(revision: &str, output: &str) -> Result<RevisionStatus, MonitorError> {
    let response: DescribeResponse =
        serde_json::from_str(output.trim()).map_err(|e| MonitorError::StatusDecode {
            revision: revision.to_string(),
            reason: e.to_string(),
        })?;

    let conditions = &response.status.conditions;
    match serde_json::to_string_pretty(conditions) {
        Ok(json) => tracing::debug!("conditions for {revision}: {json}"),
        Err(e) => tracing::debug!("conditions for {revision} not printable: {e}"),
    }

    Ok(RevisionStatus::from_conditions(conditions))
}

/// Describe `revision` and normalize its conditions.
pub async fn fetch_status<R: CommandRunner + ?Sized>(
    runner: &R,
    revision: &str,
    invocation_args: &[String],
) -> Result<RevisionStatus, MonitorError> {
    let output = runner
        .capture(DESCRIBE_PROGRAM, &describe_args(revision, invocation_args))
        .await
        .map_err(|source| MonitorError::StatusFetch {
            revision: revision.to_string(),
            source,
        })?;

    parse_status(revision, &output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::is_complete;
    use crate::monitor::MonitorErrorKind;
    use crate::status::ConditionKind;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn describe_args_forward_flags_in_fixed_order() {
        let invocation = args(&[
            "run",
            "deploy",
            "api",
            "--namespace=prod",
            "--image=gcr.io/p/api:1",
            "--cluster=main",
            "--platform=gke",
            "--project=acme",
            "--cluster-location=europe-west1",
        ]);

        assert_eq!(
            describe_args("api-00001-abc", &invocation),
            args(&[
                "run",
                "revisions",
                "describe",
                "api-00001-abc",
                "--project=acme",
                "--platform=gke",
                "--cluster=main",
                "--cluster-location=europe-west1",
                "--namespace=prod",
                "--format=json",
            ])
        );
    }

    #[test]
    fn describe_args_omit_missing_flags() {
        let invocation = args(&["--platform=gke"]);
        assert_eq!(
            describe_args("rev", &invocation),
            args(&[
                "run",
                "revisions",
                "describe",
                "rev",
                "--platform=gke",
                "--format=json"
            ])
        );
    }

    #[test]
    fn cluster_prefix_does_not_match_cluster_location() {
        let invocation = args(&["--cluster-location=us-east1"]);
        assert_eq!(find_flag(&invocation, "--cluster="), None);
        assert_eq!(
            find_flag(&invocation, "--cluster-location="),
            Some("--cluster-location=us-east1")
        );
    }

    #[test]
    fn parses_conditions() {
        let output = r#"
            {"status": {"conditions": [
                {"type": "Active", "status": "True"},
                {"type": "Ready", "status": "Unknown", "reason": "Deploying"}
            ]}}
        "#;
        let status = parse_status("rev", output).unwrap();
        assert!(status.condition(ConditionKind::Active).satisfied);
        assert_eq!(
            status.condition(ConditionKind::Ready).reason.as_deref(),
            Some("Deploying")
        );
    }

    #[test]
    fn odd_transition_times_do_not_fail_decoding() {
        let output = r#"{"status": {"conditions": [
            {"type": "Active", "status": "True", "lastTransitionTime": ""},
            {"type": "Ready", "status": "True", "lastTransitionTime": "2024-03-01T12:00:00"},
            {"type": "ContainerHealthy", "status": "True", "lastTransitionTime": "2024-03-01 12:00:00"},
            {"type": "ResourcesAvailable", "status": "True", "lastTransitionTime": "2024-03-01T12:00:00Z"}
        ]}}"#;
        let status = parse_status("rev-1", output).unwrap();
        assert!(is_complete(&status));
        assert_eq!(status.condition(ConditionKind::Ready).last_transition_time, None);
        assert!(
            status
                .condition(ConditionKind::ResourcesAvailable)
                .last_transition_time
                .is_some()
        );
    }

    #[test]
    fn invalid_json_names_revision() {
        let err = parse_status("rev-9", "ERROR: not json").unwrap_err();
        assert_eq!(err.kind(), MonitorErrorKind::StatusDecode);
        let message = err.to_string();
        assert!(message.contains("\"rev-9\""));
        assert!(message.contains("Reason: "));
    }

    #[test]
    fn missing_conditions_path_is_decode_error() {
        let err = parse_status("rev-9", r#"{"status": {}}"#).unwrap_err();
        assert_eq!(err.kind(), MonitorErrorKind::StatusDecode);
        assert!(err.to_string().contains("conditions"));
    }
}
