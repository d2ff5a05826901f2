//! Release crawl pipeline.
//!
//! For each platform:
//!
//! ```text
//! discover ──► decide ──Skip──► version file
//!                │
//!             Proceed
//!                ▼
//!            download ──► SHA-256 ──► verify (if published) ──► ledger + version file
//! ```
//!
//! Every failure is folded into a [`PlatformReport`], so one platform's
//! problems never stop the next platform from being crawled.

mod error;
mod layout;
mod report;
mod version_file;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::discovery::{Discovery, VersionDescriptor};
use crate::download::{
    calculate_file_checksum, verify_checksum, DownloadProgressCallback, ParallelDownloadEngine,
};
use crate::ledger::{Platform, VersionLedger, VersionRecord};
use crate::naming::installer_path;
use crate::update::{decide, UpdateDecision};

pub use error::{CrawlError, CrawlResult};
pub use layout::{StorageLayout, DEFAULT_DOWNLOADS_DIR, DEFAULT_LEDGER_FILE, DEFAULT_VERSIONS_DIR};
pub use report::{PlatformOutcome, PlatformReport};
pub use version_file::{read_version_file, write_version_file};

/// Builds a progress callback for an installer about to be downloaded.
///
/// Receives the installer file name.
pub type ProgressFactory = Arc<dyn Fn(&str) -> DownloadProgressCallback + Send + Sync>;

/// Runs discovery, update decisions and downloads against a ledger.
pub struct Crawler {
    engine: ParallelDownloadEngine,
    ledger: VersionLedger,
    layout: StorageLayout,
    progress: Option<ProgressFactory>,
}

impl Crawler {
    pub fn new(engine: ParallelDownloadEngine, ledger: VersionLedger, layout: StorageLayout) -> Self {
        Self {
            engine,
            ledger,
            layout,
            progress: None,
        }
    }

    /// Report download progress through callbacks built by `factory`.
    pub fn with_progress(mut self, factory: ProgressFactory) -> Self {
        self.progress = Some(factory);
        self
    }

    pub fn ledger(&self) -> &VersionLedger {
        &self.ledger
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Crawl every platform in order.
    pub fn crawl_all(&mut self, discoveries: &[Box<dyn Discovery>]) -> Vec<PlatformReport> {
        if let Err(e) = self.layout.ensure_dirs() {
            warn!(error = %e, "Failed to create storage directories");
        }

        discoveries
            .iter()
            .map(|discovery| self.crawl_platform(discovery.as_ref()))
            .collect()
    }

    /// Crawl a single platform.
    pub fn crawl_platform(&mut self, discovery: &dyn Discovery) -> PlatformReport {
        let platform = discovery.platform();
        info!(%platform, "Checking for new release");

        let descriptor = match discovery.discover() {
            Ok(descriptor) => descriptor,
            Err(e) => {
                error!(%platform, error = %e, "Discovery failed, nothing recorded");
                return PlatformReport::failed(VersionRecord::unknown(platform, e.to_string()));
            }
        };

        match decide(platform, &descriptor, self.ledger.latest(platform)) {
            UpdateDecision::Skip(current) => {
                info!(
                    %platform,
                    version = %current.version,
                    build = ?current.build_number,
                    "Release already recorded, skipping download"
                );
                self.save_version_file(&current);
                PlatformReport::skipped(current)
            }
            UpdateDecision::Proceed => {
                info!(
                    %platform,
                    version = %descriptor.version,
                    build = ?descriptor.build_number,
                    url = %descriptor.download_url,
                    "New release found, downloading"
                );
                match self.update(platform, &descriptor) {
                    Ok(record) => {
                        self.save_version_file(&record);
                        PlatformReport::updated(record)
                    }
                    Err(e) => {
                        error!(
                            %platform,
                            version = %descriptor.version,
                            error = %e,
                            "Update failed, nothing recorded"
                        );
                        PlatformReport::failed(
                            base_record(platform, &descriptor).with_error(e.to_string()),
                        )
                    }
                }
            }
        }
    }

    /// Download, stamp and record a new release.
    fn update(
        &mut self,
        platform: Platform,
        descriptor: &VersionDescriptor,
    ) -> CrawlResult<VersionRecord> {
        let dest = planned_installer_path(&self.layout, platform, descriptor);

        let on_progress = self.progress.as_ref().map(|factory| {
            let name = dest
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            factory(&name)
        });

        let report = self
            .engine
            .download(&descriptor.download_url, &dest, on_progress)?;

        let file_hash = match stamp(&dest, descriptor.checksum.as_deref()) {
            Ok(hash) => hash,
            Err(e) => {
                discard(&dest);
                return Err(e);
            }
        };
        info!(
            %platform,
            path = %dest.display(),
            bytes = report.bytes_written,
            sha256 = %file_hash,
            "Download complete"
        );

        let mut record = base_record(platform, descriptor);
        record.local_file = Some(dest.clone());
        record.file_hash = Some(file_hash);

        if let Err(e) = self.ledger.upsert(record.clone()) {
            discard(&dest);
            return Err(e.into());
        }
        Ok(record)
    }

    fn save_version_file(&self, record: &VersionRecord) {
        if let Err(e) = write_version_file(&self.layout, record) {
            warn!(platform = %record.platform, error = %e, "Failed to save version file");
        }
    }
}

/// Hash a finished download, checking it against a published digest when
/// there is one.
fn stamp(path: &Path, expected: Option<&str>) -> CrawlResult<String> {
    match expected {
        Some(expected) => {
            verify_checksum(path, expected)?;
            Ok(expected.trim().to_ascii_lowercase())
        }
        None => Ok(calculate_file_checksum(path)?),
    }
}

fn discard(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        warn!(path = %path.display(), error = %e, "Failed to remove rejected download");
    }
}

fn base_record(platform: Platform, descriptor: &VersionDescriptor) -> VersionRecord {
    VersionRecord::new(platform, descriptor.version.clone())
        .with_build_number(descriptor.build_number.clone())
        .with_release_date(descriptor.release_date)
        .with_download_url(descriptor.download_url.clone())
}

/// Path a descriptor's installer would be saved to.
pub fn planned_installer_path(
    layout: &StorageLayout,
    platform: Platform,
    descriptor: &VersionDescriptor,
) -> PathBuf {
    installer_path(
        &layout.downloads_dir,
        platform,
        &descriptor.version,
        descriptor.build_number.as_deref(),
        descriptor.release_date,
    )
}
