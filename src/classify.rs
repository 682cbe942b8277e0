// ABOUTME: Failure classification of deploy-command transcripts.
// ABOUTME: Finds the revision a failed deploy targeted, with a latest-revision fallback.

use async_trait::async_trait;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::fetch::find_flag;
use crate::monitor::MonitorError;
use crate::runner::{CommandError, CommandRunner};

// Compiled on first use.
static SCHEDULING_FAILED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"ERROR: \(gcloud\.run\.deploy\) Revision "([^"]+)" failed with message: 0/\d+ nodes"#,
    )
    .expect("constant regex pattern is valid")
});

static IMAGE_RESOLUTION_TIMED_OUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"ERROR: \(gcloud\.run\.deploy\) Revision "([^"]+)" failed with message: "#,
        r#"Unable to fetch image "([^"]+)": failed to resolve image to digest: "#,
        r#"Get "([^"]+)": context deadline exceeded."#,
    ))
    .expect("constant regex pattern is valid")
});

static INGRESS_RECONCILIATION_FAILED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ERROR: \(gcloud\.run\.deploy\) Ingress reconciliation failed")
        .expect("constant regex pattern is valid")
});

/// Known ways a deploy can fail while still leaving a revision to watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The revision could not be scheduled onto any node.
    SchedulingFailed,
    /// Resolving the image digest timed out.
    ImageResolutionTimedOut,
    /// The ingress for the service did not reconcile.
    IngressReconciliationFailed,
    /// The configuration has no ready revision yet.
    NoReadyRevision,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::SchedulingFailed => "revision failed scheduling",
            FailureKind::ImageResolutionTimedOut => "image resolution timed out",
            FailureKind::IngressReconciliationFailed => "ingress reconciliation failed",
            FailureKind::NoReadyRevision => "configuration has no ready revision",
        };
        f.write_str(name)
    }
}

/// A single matcher hit against a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureMatch {
    pub kind: FailureKind,
    /// Revision named by the transcript, if the pattern captures one.
    pub revision: Option<String>,
}

struct Matcher {
    kind: FailureKind,
    pattern: Regex,
    captures_revision: bool,
}

impl Matcher {
    fn apply(&self, transcript: &str) -> Option<FailureMatch> {
        let captures = self.pattern.captures(transcript)?;
        let revision = if self.captures_revision {
            captures.get(1).map(|m| m.as_str().to_string())
        } else {
            None
        };
        Some(FailureMatch {
            kind: self.kind,
            revision,
        })
    }
}

/// Ordered set of transcript matchers.
///
/// Every matcher is evaluated; when several match, the last one in matcher
/// order decides the outcome.
pub struct FailureClassifier {
    matchers: Vec<Matcher>,
}

impl FailureClassifier {
    /// Build the matcher set for a deploy targeting `namespace`.
    pub fn new(namespace: Option<&str>) -> Self {
        let mut matchers = vec![
            Matcher {
                kind: FailureKind::SchedulingFailed,
                pattern: SCHEDULING_FAILED.clone(),
                captures_revision: true,
            },
            Matcher {
                kind: FailureKind::ImageResolutionTimedOut,
                pattern: IMAGE_RESOLUTION_TIMED_OUT.clone(),
                captures_revision: true,
            },
            Matcher {
                kind: FailureKind::IngressReconciliationFailed,
                pattern: INGRESS_RECONCILIATION_FAILED.clone(),
                captures_revision: false,
            },
        ];

        if let Some(namespace) = namespace {
            let pattern = format!(
                r#"ERROR: \(gcloud\.run\.deploy\) Configuration "{}" does not have any ready Revision\."#,
                regex::escape(namespace)
            );
            match Regex::new(&pattern) {
                Ok(pattern) => matchers.push(Matcher {
                    kind: FailureKind::NoReadyRevision,
                    pattern,
                    captures_revision: false,
                }),
                Err(e) => tracing::warn!("skipping ready-revision matcher for {namespace}: {e}"),
            }
        }

        Self { matchers }
    }

    /// All matcher hits, in matcher order.
    pub fn matches(&self, transcript: &str) -> Vec<FailureMatch> {
        self.matchers
            .iter()
            .filter_map(|matcher| matcher.apply(transcript))
            .collect()
    }

    /// The deciding match: the last hit in matcher order.
    pub fn classify(&self, transcript: &str) -> Option<FailureMatch> {
        let mut hits = self.matches(transcript);
        if hits.len() > 1 {
            tracing::debug!(
                "transcript matched {} failure patterns, using {}",
                hits.len(),
                hits[hits.len() - 1].kind
            );
        }
        hits.pop()
    }
}

/// Looks up the most recently created revision of a service.
#[async_trait]
pub trait RevisionLookup: Send + Sync {
    async fn latest_revision(
        &self,
        namespace: &str,
        cluster: Option<&str>,
    ) -> Result<String, CommandError>;
}

/// Latest-revision lookup that lists revisions through the command runner.
pub struct CommandRevisionLookup<'a, R> {
    runner: &'a R,
    flags: Vec<String>,
}

impl<'a, R: CommandRunner> CommandRevisionLookup<'a, R> {
    /// Create a lookup forwarding project, platform and location flags
    /// from the deploy invocation.
    pub fn new(runner: &'a R, invocation_args: &[String]) -> Self {
        let flags = ["--project=", "--platform=", "--cluster-location="]
            .iter()
            .filter_map(|prefix| find_flag(invocation_args, prefix))
            .map(str::to_string)
            .collect();
        Self { runner, flags }
    }

    fn list_args(&self, namespace: &str, cluster: Option<&str>) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "revisions".to_string(),
            "list".to_string(),
            format!("--service={namespace}"),
        ];
        if let Some(cluster) = cluster {
            args.push(format!("--cluster={cluster}"));
        }
        args.extend(self.flags.iter().cloned());
        args.push("--sort-by=~metadata.creationTimestamp".to_string());
        args.push("--limit=1".to_string());
        args.push("--format=value(metadata.name)".to_string());
        args
    }
}

#[async_trait]
impl<R: CommandRunner> RevisionLookup for CommandRevisionLookup<'_, R> {
    async fn latest_revision(
        &self,
        namespace: &str,
        cluster: Option<&str>,
    ) -> Result<String, CommandError> {
        let output = self
            .runner
            .capture("gcloud", &self.list_args(namespace, cluster))
            .await?;
        Ok(output.trim().to_string())
    }
}

/// Determine which revision a failed deploy targeted.
///
/// Falls back to the latest revision of `namespace` when the deciding
/// pattern does not name one.
pub async fn find_revision(
    transcript: &str,
    namespace: Option<&str>,
    cluster: Option<&str>,
    lookup: &dyn RevisionLookup,
) -> Result<String, MonitorError> {
    let hit = FailureClassifier::new(namespace)
        .classify(transcript)
        .ok_or(MonitorError::UnclassifiableFailure)?;

    tracing::debug!("deploy failure classified as: {}", hit.kind);

    if let Some(revision) = hit.revision {
        return Ok(revision);
    }

    // Ingress failures can be reported without a namespace to look up.
    let namespace = namespace.ok_or(MonitorError::UnclassifiableFailure)?;
    let revision = lookup
        .latest_revision(namespace, cluster)
        .await
        .map_err(|source| MonitorError::RevisionLookup {
            namespace: namespace.to_string(),
            source,
        })?;

    if revision.is_empty() {
        return Err(MonitorError::UnclassifiableFailure);
    }
    Ok(revision)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEDULING: &str = r#"Deploying container to Cloud Run for Anthos service [api] in namespace [default]
ERROR: (gcloud.run.deploy) Revision "rev-42" failed with message: 0/3 nodes are available: 3 Insufficient cpu."#;

    const IMAGE_TIMEOUT: &str = r#"ERROR: (gcloud.run.deploy) Revision "api-00007-xyz" failed with message: Unable to fetch image "gcr.io/p/api:1": failed to resolve image to digest: Get "https://gcr.io/v2/": context deadline exceeded."#;

    const INGRESS: &str = "ERROR: (gcloud.run.deploy) Ingress reconciliation failed";

    const NO_READY: &str =
        r#"ERROR: (gcloud.run.deploy) Configuration "api" does not have any ready Revision."#;

    #[test]
    fn scheduling_failure_captures_revision() {
        let hit = FailureClassifier::new(Some("api")).classify(SCHEDULING).unwrap();
        assert_eq!(hit.kind, FailureKind::SchedulingFailed);
        assert_eq!(hit.revision.as_deref(), Some("rev-42"));
    }

    #[test]
    fn image_timeout_captures_revision_not_image() {
        let hit = FailureClassifier::new(None).classify(IMAGE_TIMEOUT).unwrap();
        assert_eq!(hit.kind, FailureKind::ImageResolutionTimedOut);
        assert_eq!(hit.revision.as_deref(), Some("api-00007-xyz"));
    }

    #[test]
    fn ingress_failure_needs_lookup() {
        let hit = FailureClassifier::new(Some("api")).classify(INGRESS).unwrap();
        assert_eq!(hit.kind, FailureKind::IngressReconciliationFailed);
        assert_eq!(hit.revision, None);
    }

    #[test]
    fn no_ready_revision_is_namespace_specific() {
        let hit = FailureClassifier::new(Some("api")).classify(NO_READY).unwrap();
        assert_eq!(hit.kind, FailureKind::NoReadyRevision);

        assert!(FailureClassifier::new(Some("web")).classify(NO_READY).is_none());
        assert!(FailureClassifier::new(None).classify(NO_READY).is_none());
    }

    #[test]
    fn namespace_is_matched_literally() {
        let transcript =
            r#"ERROR: (gcloud.run.deploy) Configuration "apiX" does not have any ready Revision."#;
        assert!(FailureClassifier::new(Some("api.")).classify(transcript).is_none());
    }

    #[test]
    fn last_match_wins() {
        let transcript = format!("{SCHEDULING}\n{INGRESS}");
        let classifier = FailureClassifier::new(Some("api"));

        let hits = classifier.matches(&transcript);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].kind, FailureKind::SchedulingFailed);

        let hit = classifier.classify(&transcript).unwrap();
        assert_eq!(hit.kind, FailureKind::IngressReconciliationFailed);
    }

    #[test]
    fn unknown_transcript_has_no_match() {
        let classifier = FailureClassifier::new(Some("api"));
        assert!(classifier.classify("ERROR: permission denied").is_none());
        assert!(classifier.classify("").is_none());
    }

    #[test]
    fn lookup_lists_newest_revision_with_forwarded_flags() {
        let runner = crate::runner::ProcessRunner;
        let invocation: Vec<String> = [
            "run",
            "deploy",
            "api",
            "--cluster-location=us-east1",
            "--namespace=default",
            "--platform=gke",
            "--project=acme",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let lookup = CommandRevisionLookup::new(&runner, &invocation);

        assert_eq!(
            lookup.list_args("api", Some("main")),
            vec![
                "run",
                "revisions",
                "list",
                "--service=api",
                "--cluster=main",
                "--project=acme",
                "--platform=gke",
                "--cluster-location=us-east1",
                "--sort-by=~metadata.creationTimestamp",
                "--limit=1",
                "--format=value(metadata.name)",
            ]
        );
        assert_eq!(
            lookup.list_args("api", None),
            vec![
                "run",
                "revisions",
                "list",
                "--service=api",
                "--project=acme",
                "--platform=gke",
                "--cluster-location=us-east1",
                "--sort-by=~metadata.creationTimestamp",
                "--limit=1",
                "--format=value(metadata.name)",
            ]
        );
    }

    #[test]
    fn failure_kind_display() {
        assert_eq!(
            FailureKind::SchedulingFailed.to_string(),
            "revision failed scheduling"
        );
        assert_eq!(
            FailureKind::NoReadyRevision.to_string(),
            "configuration has no ready revision"
        );
    }
}
