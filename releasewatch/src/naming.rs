//! Deterministic installer file names.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::ledger::Platform;

/// Build number used for macOS releases that do not publish one.
pub const DEFAULT_BUILD_NUMBER: &str = "0";

/// File name for an installer.
///
/// Windows: `WPS_Office_{version}[_{date}].exe`
/// macOS: `WPS_Office_{version}_{build}[_{date}].zip`
pub fn installer_filename(
    platform: Platform,
    version: &str,
    build_number: Option<&str>,
    release_date: Option<NaiveDate>,
) -> String {
    let date_suffix = release_date
        .map(|d| format!("_{}", d.format("%Y-%m-%d")))
        .unwrap_or_default();

    match platform {
        Platform::Windows => format!("WPS_Office_{}{}.exe", version, date_suffix),
        Platform::MacOs => format!(
            "WPS_Office_{}_{}{}.zip",
            version,
            build_number.unwrap_or(DEFAULT_BUILD_NUMBER),
            date_suffix
        ),
    }
}

/// Full path of an installer under `downloads_dir/<platform>/`.
pub fn installer_path(
    downloads_dir: &Path,
    platform: Platform,
    version: &str,
    build_number: Option<&str>,
    release_date: Option<NaiveDate>,
) -> PathBuf {
    downloads_dir.join(platform.slug()).join(installer_filename(
        platform,
        version,
        build_number,
        release_date,
    ))
}
