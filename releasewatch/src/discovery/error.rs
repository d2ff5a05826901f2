//! Error types for version discovery.

use thiserror::Error;

use crate::download::DownloadError;
use crate::ledger::Platform;

/// Result type for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Errors that can occur while resolving the latest published release.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A page could not be retrieved.
    #[error("failed to fetch {url}: {source}")]
    Fetch { url: String, source: DownloadError },

    /// A page was retrieved but did not contain a recognizable version.
    #[error("no version found in {url}")]
    VersionNotFound { url: String },

    /// A version was found but no installer URL could be resolved.
    #[error("no installer link for {platform} {version}")]
    NoInstallerUrl { platform: Platform, version: String },

    /// Every discovery strategy failed.
    #[error("could not discover {platform} release: {reason}")]
    NotFound { platform: Platform, reason: String },

    /// A built-in pattern failed to compile.
    #[error("invalid pattern: {0}")]
    Pattern(String),
}
