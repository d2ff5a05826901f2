//! Resolving the latest published release per platform.
//!
//! Each platform has a [`Discovery`] implementation that turns some public
//! page into a [`VersionDescriptor`]: a version identifier plus a download
//! URL. Discovery is intentionally thin; it fetches text over a
//! [`RangeTransport`](crate::download::RangeTransport) and applies regular
//! expressions.

mod captured;
mod error;
mod fixed;
mod macos;
mod windows;

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::ledger::Platform;

pub use captured::CapturedUrls;
pub use error::{DiscoveryError, DiscoveryResult};
pub use fixed::StaticDiscovery;
pub use macos::{parse_version_text, MacDiscovery, MacDiscoveryConfig, ParsedVersion};
pub use windows::{WindowsDiscovery, WindowsDiscoveryConfig};

/// A release as reported by a discovery collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDescriptor {
    pub version: String,
    pub build_number: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub download_url: String,
    /// Publisher-supplied SHA-256, when available.
    pub checksum: Option<String>,
}

impl VersionDescriptor {
    pub fn new(version: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            build_number: None,
            release_date: None,
            download_url: download_url.into(),
            checksum: None,
        }
    }

    pub fn with_build_number(mut self, build_number: Option<String>) -> Self {
        self.build_number = build_number;
        self
    }

    pub fn with_release_date(mut self, release_date: Option<NaiveDate>) -> Self {
        self.release_date = release_date;
        self
    }

    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }
}

/// Source of the latest release for one platform.
pub trait Discovery: Send + Sync {
    /// Platform this collaborator reports on.
    fn platform(&self) -> Platform;

    /// Resolve the currently published release.
    fn discover(&self) -> DiscoveryResult<VersionDescriptor>;
}

/// Compile a built-in pattern once.
pub(crate) fn cached_regex(
    cell: &'static OnceLock<Result<Regex, regex::Error>>,
    pattern: &str,
) -> DiscoveryResult<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern))
        .as_ref()
        .map_err(|e| DiscoveryError::Pattern(e.to_string()))
}
