//! Configuration file support.
//!
//! Settings live in an INI file, by default
//! `~/.config/releasewatch/config.ini` (platform config directory):
//!
//! ```ini
//! [download]
//! workers = 16
//! chunk_size = 6291456
//! min_chunk_size = 1048576
//! timeout = 30
//! max_attempts = 3
//! retry_delay_ms = 500
//!
//! [storage]
//! versions_dir = versions
//! downloads_dir = downloads
//! ledger_file = version_history.json
//!
//! [windows]
//! download_base_url = https://official-package.wpscdn.cn/wps/download
//! index_url = https://baoku.360.cn/soft/show/appid/104693057
//! fallback_version = 21915
//!
//! [macos]
//! page_url = https://mac.wps.cn
//!
//! [logging]
//! dir = logs
//! level = info
//! ```

mod error;
mod file;
mod keys;

use std::path::PathBuf;

pub use error::{ConfigError, ConfigResult};
pub use file::{ConfigFile, DownloadSettings, MacSettings, StorageSettings};
pub use keys::ConfigKey;

/// Application directory name under the platform config directory.
const APP_DIR: &str = "releasewatch";

/// Configuration file name.
const CONFIG_FILE: &str = "config.ini";

/// Default configuration file location.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(CONFIG_FILE)
}
