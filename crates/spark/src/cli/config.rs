//! Configuration command handlers.

use super::commands::ConfigCommands;
use spark::{BatchConfig, CallConfig, ConfigSources, OutputError, SparkResult, config_toml, env_template};
use std::path::PathBuf;
use tracing::info;

/// Handle configuration commands.
pub fn handle_config_command(cmd: ConfigCommands) -> SparkResult<()> {
    match cmd {
        ConfigCommands::Show { file } => show_config(file),
        ConfigCommands::Template { output } => write_template(output),
    }
}

/// Standard sources, optionally with one extra file on top.
pub fn sources(file: Option<PathBuf>) -> ConfigSources {
    match file {
        Some(path) => ConfigSources::standard().with_file(path),
        None => ConfigSources::standard(),
    }
}

fn show_config(file: Option<PathBuf>) -> SparkResult<()> {
    let sources = sources(file);
    let call = CallConfig::load_from(&sources)?;
    let batch = BatchConfig::load_from(&sources)?;
    print!("{}", config_toml(&call, &batch)?);
    Ok(())
}

fn write_template(output: Option<PathBuf>) -> SparkResult<()> {
    let template = env_template(&CallConfig::default(), &BatchConfig::default())?;
    match output {
        Some(path) => {
            std::fs::write(&path, template).map_err(|e| {
                OutputError::new(format!("Failed to write {}: {}", path.display(), e))
            })?;
            info!(path = %path.display(), "Wrote environment template");
        }
        None => print!("{}", template),
    }
    Ok(())
}
