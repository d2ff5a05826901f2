//! Logging setup.
//!
//! Installs a `tracing` subscriber with two outputs: human-readable lines on
//! stderr and a daily-rolling file under the configured log directory. The
//! filter comes from `RUST_LOG` when set, otherwise from the configured level.

use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use time::format_description::well_known::Rfc3339;
pub use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Default log directory.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log file name prefix (a date suffix is added on rotation).
pub const LOG_FILE_NAME: &str = "releasewatch.log";

/// Where and how verbosely to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub dir: PathBuf,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_LOG_DIR),
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Errors from logging initialization.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("invalid log filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },

    #[error("failed to install log subscriber: {0}")]
    Init(String),
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// life of the process.
pub fn init(config: &LoggingConfig) -> Result<WorkerGuard, LoggingError> {
    fs::create_dir_all(&config.dir).map_err(|e| LoggingError::CreateDir {
        path: config.dir.clone(),
        source: e,
    })?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| LoggingError::Filter {
            filter: config.level.clone(),
            reason: e.to_string(),
        })?,
    };

    let file_appender = tracing_appender::rolling::daily(&config.dir, LOG_FILE_NAME);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let timer = LocalTime::new(Rfc3339);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_timer(timer.clone())
                .with_target(false),
        )
        .with(
            fmt::layer()
                .with_writer(file_writer)
                .with_timer(timer)
                .with_ansi(false),
        )
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    Ok(guard)
}
