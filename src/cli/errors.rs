//! CLI-specific error types. All CLI errors are fatal.

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("runtime setup failed: {0}")]
    Runtime(std::io::Error),

    #[error("http server failed: {0}")]
    Http(std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;
