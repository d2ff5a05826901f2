//! Error types for the crawl pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::discovery::DiscoveryError;
use crate::download::DownloadError;
use crate::ledger::LedgerError;

/// Result type for crawl operations.
pub type CrawlResult<T> = Result<T, CrawlError>;

/// Errors raised inside one platform's crawl.
///
/// These never escape [`Crawler::crawl_platform`](super::Crawler::crawl_platform);
/// they are folded into a failed report.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Failed to write the per-platform version file.
    #[error("failed to write version file {}: {source}", path.display())]
    VersionFile { path: PathBuf, source: io::Error },

    #[error("failed to serialize version record: {0}")]
    Serialize(#[from] serde_json::Error),
}
