//! INI configuration file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use tracing::debug;

use super::error::{ConfigError, ConfigResult};
use super::keys::ConfigKey;
use super::config_file_path;
use crate::crawler::{StorageLayout, DEFAULT_DOWNLOADS_DIR, DEFAULT_LEDGER_FILE, DEFAULT_VERSIONS_DIR};
use crate::discovery::{MacDiscoveryConfig, WindowsDiscoveryConfig};
use crate::download::{
    DownloadConfig, RetryPolicy, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_ATTEMPTS, DEFAULT_MIN_CHUNK_SIZE,
    DEFAULT_RETRY_DELAY_MS, DEFAULT_TIMEOUT_SECS, DEFAULT_WORKERS,
};
use crate::logging::LoggingConfig;

/// `[download]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    pub workers: usize,
    pub chunk_size: u64,
    pub min_chunk_size: u64,
    /// Per-request timeout in seconds.
    pub timeout: u64,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            min_chunk_size: DEFAULT_MIN_CHUNK_SIZE,
            timeout: DEFAULT_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

/// `[storage]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    pub versions_dir: PathBuf,
    pub downloads_dir: PathBuf,
    pub ledger_file: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            versions_dir: PathBuf::from(DEFAULT_VERSIONS_DIR),
            downloads_dir: PathBuf::from(DEFAULT_DOWNLOADS_DIR),
            ledger_file: PathBuf::from(DEFAULT_LEDGER_FILE),
        }
    }
}

/// `[macos]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacSettings {
    pub page_url: String,
}

impl Default for MacSettings {
    fn default() -> Self {
        Self {
            page_url: MacDiscoveryConfig::default().page_url,
        }
    }
}

/// Complete configuration as stored in `config.ini`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub download: DownloadSettings,
    pub storage: StorageSettings,
    pub windows: WindowsDiscoveryConfig,
    pub macos: MacSettings,
    pub logging: LoggingConfig,
}

impl ConfigFile {
    /// Load from the default location, falling back to defaults when the
    /// file does not exist.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    /// Build from parsed INI. Missing keys keep their defaults; unknown keys
    /// are ignored.
    pub fn from_ini(ini: &Ini) -> ConfigResult<Self> {
        let mut config = Self::default();
        for key in ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.key_name()) {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Render every setting as INI.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini
    }

    /// Save to the default location.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let write_err = |source: std::io::Error| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        self.to_ini().write_to_file(path).map_err(write_err)
    }

    /// Engine settings.
    pub fn download_config(&self) -> DownloadConfig {
        let d = &self.download;
        DownloadConfig::new()
            .with_workers(d.workers)
            .with_chunk_size(d.chunk_size)
            .with_min_chunk_size(d.min_chunk_size)
            .with_timeout(Duration::from_secs(d.timeout))
            .with_retry_policy(RetryPolicy::fixed(
                d.max_attempts,
                Duration::from_millis(d.retry_delay_ms),
            ))
    }

    pub fn storage_layout(&self) -> StorageLayout {
        StorageLayout {
            versions_dir: self.storage.versions_dir.clone(),
            downloads_dir: self.storage.downloads_dir.clone(),
            ledger_file: self.storage.ledger_file.clone(),
        }
    }

    pub fn windows_discovery(&self) -> WindowsDiscoveryConfig {
        self.windows.clone()
    }

    pub fn mac_discovery(&self) -> MacDiscoveryConfig {
        MacDiscoveryConfig {
            page_url: self.macos.page_url.clone(),
            ..MacDiscoveryConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&temp.path().join("config.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.download.workers, 16);
        assert_eq!(config.windows.fallback_version, "21915");
        assert_eq!(config.macos.page_url, "https://mac.wps.cn");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        fs::write(
            &path,
            "[download]\nworkers = 4\nchunk_size = 2097152\n\n[unrelated]\nfoo = bar\n",
        )
        .unwrap();

        let config = ConfigFile::load_from(&path).unwrap();

        assert_eq!(config.download.workers, 4);
        assert_eq!(config.download.chunk_size, 2 * 1024 * 1024);
        assert_eq!(config.download.min_chunk_size, DEFAULT_MIN_CHUNK_SIZE);
        assert_eq!(config.storage, StorageSettings::default());
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        fs::write(&path, "[download]\nworkers = many\n").unwrap();

        let result = ConfigFile::load_from(&path);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.ini");
        let mut config = ConfigFile::default();
        config.download.workers = 8;
        config.storage.downloads_dir = PathBuf::from("/srv/installers");
        config.logging.level = "debug".to_string();

        config.save_to(&path).unwrap();
        let loaded = ConfigFile::load_from(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_download_config_conversion() {
        let mut config = ConfigFile::default();
        config.download.max_attempts = 5;
        config.download.retry_delay_ms = 250;
        config.download.timeout = 10;

        let download = config.download_config();

        assert_eq!(download.workers, 16);
        assert_eq!(download.timeout, Duration::from_secs(10));
        assert_eq!(
            download.retry,
            RetryPolicy::fixed(5, Duration::from_millis(250))
        );
    }

    #[test]
    fn test_storage_layout_conversion() {
        let mut config = ConfigFile::default();
        config.storage.versions_dir = PathBuf::from("/data/versions");

        let layout = config.storage_layout();
        assert_eq!(layout.versions_dir, PathBuf::from("/data/versions"));
        assert_eq!(layout.ledger_file, PathBuf::from("version_history.json"));
    }
}
