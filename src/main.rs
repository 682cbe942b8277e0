// ABOUTME: Entry point for the revwatch CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;

use clap::Parser;
use cli::{Cli, Commands, TargetArgs};
use revwatch::classify::{CommandRevisionLookup, find_revision};
use revwatch::config::{self, WaitConfig};
use revwatch::error::Result;
use revwatch::evaluate::{evaluate, summary};
use revwatch::fetch::fetch_status;
use revwatch::monitor::{DeployResult, Monitor, wait_for_revision};
use revwatch::output::{Output, OutputMode};
use revwatch::runner::{ProcessRunner, TokioClock};
use std::env;
use std::io::Read;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else if cli.quiet || cli.json {
        EnvFilter::new("warn")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(cli.verbose)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    let output = Output::new(mode);
    if let Err(e) = run(cli, output).await {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, mut output: Output) -> Result<()> {
    match cli.command {
        Commands::Init { namespace, force } => {
            let cwd = env::current_dir()?;
            config::init_config(&cwd, namespace.as_deref(), force)?;
            output.success(&format!("Created {}", config::CONFIG_FILENAME), None);
            Ok(())
        }
        Commands::Wait {
            exit_status,
            transcript,
            target,
            interval,
            timeout,
            platform,
            deploy_args,
        } => {
            let mut config = load_config(cli.config.as_deref(), &target)?;
            if let Some(interval) = interval {
                config.interval = interval;
            }
            if let Some(timeout) = timeout {
                config.timeout = timeout;
            }
            if let Some(platform) = platform {
                config.platform = platform;
            }
            config.validate()?;

            // A clean deploy needs no transcript, so do not block on stdin for it.
            let transcript = if exit_status == 0 {
                String::new()
            } else {
                read_transcript(transcript.as_deref())?
            };
            let result = DeployResult::new(exit_status, transcript);

            output.start_timer();
            let runner = ProcessRunner;
            let lookup = CommandRevisionLookup::new(&runner, &deploy_args);
            let monitor = Monitor::new(config, deploy_args);
            let report =
                wait_for_revision(&result, monitor, &runner, &TokioClock, &lookup).await?;

            match report.revision.as_deref() {
                Some(revision) => output.success(
                    &format!("Revision {revision} is ready"),
                    Some(revision),
                ),
                None => output.success("Deploy succeeded, nothing to wait for", None),
            }
            Ok(())
        }
        Commands::Classify {
            transcript,
            target,
            deploy_args,
        } => {
            let config = load_config(cli.config.as_deref(), &target)?;
            let transcript = read_transcript(transcript.as_deref())?;
            let runner = ProcessRunner;
            let lookup = CommandRevisionLookup::new(&runner, &deploy_args);
            let revision = find_revision(
                &transcript,
                config.namespace.as_deref(),
                config.cluster.as_deref(),
                &lookup,
            )
            .await?;
            output.success(&revision, Some(revision.as_str()));
            Ok(())
        }
        Commands::Status {
            revision,
            deploy_args,
        } => {
            let status = fetch_status(&ProcessRunner, &revision, &deploy_args).await?;
            output.progress(&format!("Outcome: {}", evaluate(&status)));
            output.success(&summary(&status), Some(revision.as_str()));
            Ok(())
        }
    }
}

/// Load the config file and apply target overrides from the command line.
fn load_config(path: Option<&Path>, target: &TargetArgs) -> Result<WaitConfig> {
    let mut config = match path {
        Some(path) => WaitConfig::load(path)?,
        None => WaitConfig::discover_or_default(&env::current_dir()?)?,
    };
    if let Some(namespace) = &target.namespace {
        config.namespace = Some(namespace.clone());
    }
    if let Some(cluster) = &target.cluster {
        config.cluster = Some(cluster.clone());
    }
    Ok(config)
}

fn read_transcript(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut transcript = String::new();
            std::io::stdin().read_to_string(&mut transcript)?;
            Ok(transcript)
        }
    }
}
