//! Spark CLI binary.
//!
//! This binary provides command-line access to the call layer:
//! - Print the effective configuration or an environment template
//! - Rehearse retry, cooldown and quota-gate behaviour on synthetic shots

use clap::Parser;
use spark::observability::{LogConfig, init_logging};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, handle_config_command, run_simulate};

    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_logging(LogConfig::from_verbosity(cli.verbose).with_json_logs(cli.json_logs))?;

    match cli.command {
        Commands::Config(config_cmd) => {
            handle_config_command(config_cmd)?;
        }

        Commands::Simulate(args) => {
            run_simulate(args).await?;
        }
    }

    Ok(())
}
