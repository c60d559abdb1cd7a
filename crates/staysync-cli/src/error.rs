//! CLI error types.

use staysync_engine::EngineError;
use thiserror::Error;

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Errors reported by the `staysync` command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The configuration file is missing, unreadable or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A command-line argument is inconsistent with the rest.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Io(std::io::Error::other(err))
    }
}
