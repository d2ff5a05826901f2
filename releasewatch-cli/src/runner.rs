//! Shared setup for commands that do real work.

use std::path::Path;

use releasewatch::config::{config_file_path, ConfigFile};
use releasewatch::logging::{self, WorkerGuard};
use tracing::info;

use crate::error::CliError;

/// Loaded configuration plus an installed logger.
pub struct CliRunner {
    config: ConfigFile,
    _log_guard: WorkerGuard,
}

impl CliRunner {
    /// Load configuration from `config_path` (or the default location) and
    /// start logging.
    pub fn new(config_path: Option<&Path>) -> Result<Self, CliError> {
        let config = load_config(config_path)?;
        let log_guard = logging::init(&config.logging)?;
        Ok(Self {
            config,
            _log_guard: log_guard,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log the command being run.
    pub fn log_startup(&self, command: &str) {
        info!(
            version = releasewatch::VERSION,
            command,
            log_dir = %self.config.logging.dir.display(),
            "ReleaseWatch starting"
        );
    }
}

/// Load configuration without starting logging.
pub fn load_config(config_path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path);
    Ok(ConfigFile::load_from(&path)?)
}
