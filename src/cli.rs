// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "revwatch")]
#[command(about = "Wait for a deployed revision to become ready")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the final result
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print results as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to a config file (defaults to revwatch.yml discovery)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new revwatch.yml configuration file
    Init {
        /// Service name to put in the template
        #[arg(long)]
        namespace: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Wait for the revision targeted by a deploy to become ready
    Wait {
        /// Exit status of the deploy command
        #[arg(long)]
        exit_status: i32,

        /// File holding the deploy output (reads stdin when omitted)
        #[arg(long)]
        transcript: Option<PathBuf>,

        #[command(flatten)]
        target: TargetArgs,

        /// Delay between status polls (e.g. 10s)
        #[arg(long, value_parser = humantime_serde::re::humantime::parse_duration)]
        interval: Option<Duration>,

        /// Overall deadline (e.g. 5m)
        #[arg(long, value_parser = humantime_serde::re::humantime::parse_duration)]
        timeout: Option<Duration>,

        /// Platform that supports waiting
        #[arg(long)]
        platform: Option<String>,

        /// Arguments of the deploy invocation
        #[arg(last = true)]
        deploy_args: Vec<String>,
    },

    /// Print the revision a failed deploy targeted
    Classify {
        /// File holding the deploy output (reads stdin when omitted)
        #[arg(long)]
        transcript: Option<PathBuf>,

        #[command(flatten)]
        target: TargetArgs,

        /// Arguments of the deploy invocation
        #[arg(last = true)]
        deploy_args: Vec<String>,
    },

    /// Fetch and print the current status of a revision
    Status {
        /// Revision name
        revision: String,

        /// Arguments of the deploy invocation
        #[arg(last = true)]
        deploy_args: Vec<String>,
    },
}

#[derive(Args)]
pub struct TargetArgs {
    /// Service (configuration) name the deploy targeted
    #[arg(long)]
    pub namespace: Option<String>,

    /// Cluster used to look up the latest revision
    #[arg(long)]
    pub cluster: Option<String>,
}
