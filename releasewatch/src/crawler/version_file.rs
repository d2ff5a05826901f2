//! Latest-release snapshot per platform.
//!
//! Alongside the ledger, the most recent valid record of each platform is
//! kept as a standalone JSON file for quick inspection.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::error::{CrawlError, CrawlResult};
use super::layout::StorageLayout;
use crate::ledger::{Platform, VersionRecord};

/// Write `record` to its platform's version file.
pub fn write_version_file(layout: &StorageLayout, record: &VersionRecord) -> CrawlResult<PathBuf> {
    let path = layout.version_file(record.platform);
    let io_err = |source: std::io::Error| CrawlError::VersionFile {
        path: path.clone(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let json = serde_json::to_string_pretty(record)?;
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, json).map_err(io_err)?;
    fs::rename(&temp_path, &path).map_err(io_err)?;

    info!(platform = %record.platform, path = %path.display(), "Saved version file");
    Ok(path)
}

/// Read a platform's version file, if present and valid.
pub fn read_version_file(layout: &StorageLayout, platform: Platform) -> Option<VersionRecord> {
    read_record(&layout.version_file(platform))
}

fn read_record(path: &Path) -> Option<VersionRecord> {
    let contents = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring unreadable version file");
            None
        }
    }
}
