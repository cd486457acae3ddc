//! CLI command definitions.

use clap::{Args, Parser, Subcommand};
use spark::FailureKind;
use std::path::PathBuf;

/// Spark - resilient external calls for AI video pipelines
#[derive(Parser, Debug)]
#[command(name = "spark")]
#[command(about = "Inspect call-layer settings and rehearse retry behaviour", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Run synthetic shots through the call wrapper and print a summary
    Simulate(SimulateArgs),
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show {
        /// Extra configuration file layered over the standard sources
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Print an environment-variable template with every SPARK_* setting
    Template {
        /// Write the template to this path instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Arguments for `spark simulate`
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Number of synthetic call sites
    #[arg(long, default_value = "3")]
    pub shots: usize,

    /// Attempts each site fails before succeeding
    #[arg(long, default_value = "0")]
    pub fail_first: u32,

    /// Failure kind of the failing attempts (e.g. QUOTA_EXCEEDED, transient_network)
    #[arg(long, default_value = "TRANSIENT_SERVER")]
    pub kind: FailureKind,

    /// Return placeholder responses without invoking the call
    #[arg(long)]
    pub mock: bool,

    /// Extra configuration file layered over the standard sources
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Multiply every backoff, cooldown and pause by this factor
    #[arg(long, default_value = "1.0")]
    pub delay_scale: f64,

    /// Print per-shot reports alongside the summary
    #[arg(long)]
    pub reports: bool,
}
