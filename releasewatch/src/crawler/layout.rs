//! On-disk locations used by the crawler.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::ledger::Platform;

/// Default directory for per-platform version files.
pub const DEFAULT_VERSIONS_DIR: &str = "versions";

/// Default directory for downloaded installers.
pub const DEFAULT_DOWNLOADS_DIR: &str = "downloads";

/// Default ledger file name.
pub const DEFAULT_LEDGER_FILE: &str = "version_history.json";

/// Where version files, installers and the ledger live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    pub versions_dir: PathBuf,
    pub downloads_dir: PathBuf,
    pub ledger_file: PathBuf,
}

impl Default for StorageLayout {
    fn default() -> Self {
        Self {
            versions_dir: PathBuf::from(DEFAULT_VERSIONS_DIR),
            downloads_dir: PathBuf::from(DEFAULT_DOWNLOADS_DIR),
            ledger_file: PathBuf::from(DEFAULT_LEDGER_FILE),
        }
    }
}

impl StorageLayout {
    /// Default layout rooted at `root`.
    pub fn under(root: &Path) -> Self {
        Self {
            versions_dir: root.join(DEFAULT_VERSIONS_DIR),
            downloads_dir: root.join(DEFAULT_DOWNLOADS_DIR),
            ledger_file: root.join(DEFAULT_LEDGER_FILE),
        }
    }

    /// `<downloads_dir>/<platform>`
    pub fn platform_downloads_dir(&self, platform: Platform) -> PathBuf {
        self.downloads_dir.join(platform.slug())
    }

    /// `<versions_dir>/<platform>/<platform>.json`
    pub fn version_file(&self, platform: Platform) -> PathBuf {
        self.versions_dir
            .join(platform.slug())
            .join(format!("{}.json", platform.slug()))
    }

    /// Create the per-platform directories.
    pub fn ensure_dirs(&self) -> io::Result<()> {
        for platform in Platform::ALL {
            fs::create_dir_all(self.versions_dir.join(platform.slug()))?;
            fs::create_dir_all(self.platform_downloads_dir(platform))?;
        }
        Ok(())
    }
}
