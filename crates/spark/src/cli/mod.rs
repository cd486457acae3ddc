//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the spark binary.

mod commands;
mod config;
mod simulate;

pub use commands::{Cli, Commands};
pub use config::handle_config_command;
pub use simulate::run_simulate;
