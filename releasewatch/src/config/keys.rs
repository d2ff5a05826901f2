//! Addressable configuration keys.
//!
//! Every setting in [`ConfigFile`] has a `section.key` name used both for
//! INI parsing and for `config get`/`config set`.

use std::path::PathBuf;
use std::str::FromStr;

use super::error::{ConfigError, ConfigResult};
use super::file::ConfigFile;

/// A single configuration setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    DownloadWorkers,
    DownloadChunkSize,
    DownloadMinChunkSize,
    DownloadTimeout,
    DownloadMaxAttempts,
    DownloadRetryDelayMs,
    StorageVersionsDir,
    StorageDownloadsDir,
    StorageLedgerFile,
    WindowsDownloadBaseUrl,
    WindowsIndexUrl,
    WindowsFallbackVersion,
    MacosPageUrl,
    LoggingDir,
    LoggingLevel,
}

const ALL_KEYS: [ConfigKey; 15] = [
    ConfigKey::DownloadWorkers,
    ConfigKey::DownloadChunkSize,
    ConfigKey::DownloadMinChunkSize,
    ConfigKey::DownloadTimeout,
    ConfigKey::DownloadMaxAttempts,
    ConfigKey::DownloadRetryDelayMs,
    ConfigKey::StorageVersionsDir,
    ConfigKey::StorageDownloadsDir,
    ConfigKey::StorageLedgerFile,
    ConfigKey::WindowsDownloadBaseUrl,
    ConfigKey::WindowsIndexUrl,
    ConfigKey::WindowsFallbackVersion,
    ConfigKey::MacosPageUrl,
    ConfigKey::LoggingDir,
    ConfigKey::LoggingLevel,
];

/// Accepted values for `logging.level`.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl ConfigKey {
    /// All keys in file order.
    pub fn all() -> &'static [ConfigKey] {
        &ALL_KEYS
    }

    /// INI section.
    pub fn section(&self) -> &'static str {
        use ConfigKey::*;
        match self {
            DownloadWorkers | DownloadChunkSize | DownloadMinChunkSize | DownloadTimeout
            | DownloadMaxAttempts | DownloadRetryDelayMs => "download",
            StorageVersionsDir | StorageDownloadsDir | StorageLedgerFile => "storage",
            WindowsDownloadBaseUrl | WindowsIndexUrl | WindowsFallbackVersion => "windows",
            MacosPageUrl => "macos",
            LoggingDir | LoggingLevel => "logging",
        }
    }

    /// Key within its section.
    pub fn key_name(&self) -> &'static str {
        use ConfigKey::*;
        match self {
            DownloadWorkers => "workers",
            DownloadChunkSize => "chunk_size",
            DownloadMinChunkSize => "min_chunk_size",
            DownloadTimeout => "timeout",
            DownloadMaxAttempts => "max_attempts",
            DownloadRetryDelayMs => "retry_delay_ms",
            StorageVersionsDir => "versions_dir",
            StorageDownloadsDir => "downloads_dir",
            StorageLedgerFile => "ledger_file",
            WindowsDownloadBaseUrl => "download_base_url",
            WindowsIndexUrl => "index_url",
            WindowsFallbackVersion => "fallback_version",
            MacosPageUrl => "page_url",
            LoggingDir => "dir",
            LoggingLevel => "level",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value rendered as text.
    pub fn get(&self, config: &ConfigFile) -> String {
        use ConfigKey::*;
        match self {
            DownloadWorkers => config.download.workers.to_string(),
            DownloadChunkSize => config.download.chunk_size.to_string(),
            DownloadMinChunkSize => config.download.min_chunk_size.to_string(),
            DownloadTimeout => config.download.timeout.to_string(),
            DownloadMaxAttempts => config.download.max_attempts.to_string(),
            DownloadRetryDelayMs => config.download.retry_delay_ms.to_string(),
            StorageVersionsDir => config.storage.versions_dir.display().to_string(),
            StorageDownloadsDir => config.storage.downloads_dir.display().to_string(),
            StorageLedgerFile => config.storage.ledger_file.display().to_string(),
            WindowsDownloadBaseUrl => config.windows.download_base_url.clone(),
            WindowsIndexUrl => config.windows.index_url.clone(),
            WindowsFallbackVersion => config.windows.fallback_version.clone(),
            MacosPageUrl => config.macos.page_url.clone(),
            LoggingDir => config.logging.dir.display().to_string(),
            LoggingLevel => config.logging.level.clone(),
        }
    }

    /// Parse `value` and store it.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> ConfigResult<()> {
        use ConfigKey::*;
        let value = value.trim();
        match self {
            DownloadWorkers => config.download.workers = self.parse_positive(value)? as usize,
            DownloadChunkSize => config.download.chunk_size = self.parse_positive(value)?,
            DownloadMinChunkSize => config.download.min_chunk_size = self.parse_positive(value)?,
            DownloadTimeout => config.download.timeout = self.parse_positive(value)?,
            DownloadMaxAttempts => {
                let attempts = self.parse_positive(value)?;
                config.download.max_attempts =
                    u32::try_from(attempts).map_err(|e| self.invalid(value, e.to_string()))?;
            }
            DownloadRetryDelayMs => config.download.retry_delay_ms = self.parse_number(value)?,
            StorageVersionsDir => config.storage.versions_dir = self.parse_path(value)?,
            StorageDownloadsDir => config.storage.downloads_dir = self.parse_path(value)?,
            StorageLedgerFile => config.storage.ledger_file = self.parse_path(value)?,
            WindowsDownloadBaseUrl => config.windows.download_base_url = self.parse_url(value)?,
            WindowsIndexUrl => config.windows.index_url = self.parse_url(value)?,
            WindowsFallbackVersion => {
                if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
                    return Err(self.invalid(value, "expected a numeric version"));
                }
                config.windows.fallback_version = value.to_string();
            }
            MacosPageUrl => config.macos.page_url = self.parse_url(value)?,
            LoggingDir => config.logging.dir = self.parse_path(value)?,
            LoggingLevel => {
                let level = value.to_ascii_lowercase();
                if !LOG_LEVELS.contains(&level.as_str()) {
                    return Err(self.invalid(value, "expected trace, debug, info, warn or error"));
                }
                config.logging.level = level;
            }
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    fn parse_number(&self, value: &str) -> ConfigResult<u64> {
        value
            .parse::<u64>()
            .map_err(|e| self.invalid(value, e.to_string()))
    }

    fn parse_positive(&self, value: &str) -> ConfigResult<u64> {
        match self.parse_number(value)? {
            0 => Err(self.invalid(value, "must be greater than zero")),
            n => Ok(n),
        }
    }

    fn parse_path(&self, value: &str) -> ConfigResult<PathBuf> {
        if value.is_empty() {
            return Err(self.invalid(value, "path must not be empty"));
        }
        Ok(PathBuf::from(value))
    }

    fn parse_url(&self, value: &str) -> ConfigResult<String> {
        if !(value.starts_with("http://") || value.starts_with("https://")) {
            return Err(self.invalid(value, "expected an http(s) URL"));
        }
        Ok(value.to_string())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_KEYS
            .iter()
            .copied()
            .find(|key| key.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}
