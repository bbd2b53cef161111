//! CLI module for glowd
//!
//! Provides the command-line interface:
//! - start: boot the device controller and serve until shutdown
//! - check-config: parse and validate a configuration file, then exit

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{check_config, run, start, RESTART_EXIT_CODE};
pub use errors::{CliError, CliResult};
