//! CLI error type.

use thiserror::Error;

use releasewatch::config::ConfigError;
use releasewatch::download::DownloadError;
use releasewatch::logging::LoggingError;

/// Errors that end a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    /// A setting or argument could not be used.
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    ConfigFile(#[from] ConfigError),

    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Failed to write to the terminal.
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),
}
