//! CLI argument definitions using clap
//!
//! Commands:
//! - glowd start --config <path> [--port <port>]
//! - glowd check-config --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// glowd - network-connected LED and buzzer device controller
#[derive(Parser, Debug)]
#[command(name = "glowd")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the device controller
    Start {
        /// Path to configuration file
        #[arg(long, default_value = "./glowd.toml")]
        config: PathBuf,

        /// Override the HTTP listen port from the config file
        #[arg(long)]
        port: Option<u16>,
    },

    /// Validate a configuration file and exit
    CheckConfig {
        /// Path to configuration file
        #[arg(long, default_value = "./glowd.toml")]
        config: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
