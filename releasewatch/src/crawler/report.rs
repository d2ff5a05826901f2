//! Per-platform crawl results.

use std::fmt;

use crate::ledger::{Platform, VersionRecord};

/// What happened to one platform during a crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformOutcome {
    /// The discovered release was already recorded.
    Skipped(VersionRecord),
    /// A new release was downloaded and recorded.
    Updated(VersionRecord),
    /// Discovery or download failed. The record carries the error and is
    /// not persisted.
    Failed(VersionRecord),
}

/// Result of crawling a single platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformReport {
    pub platform: Platform,
    pub outcome: PlatformOutcome,
}

impl PlatformReport {
    pub fn skipped(record: VersionRecord) -> Self {
        Self {
            platform: record.platform,
            outcome: PlatformOutcome::Skipped(record),
        }
    }

    pub fn updated(record: VersionRecord) -> Self {
        Self {
            platform: record.platform,
            outcome: PlatformOutcome::Updated(record),
        }
    }

    pub fn failed(record: VersionRecord) -> Self {
        Self {
            platform: record.platform,
            outcome: PlatformOutcome::Failed(record),
        }
    }

    /// The record behind the outcome.
    pub fn record(&self) -> &VersionRecord {
        match &self.outcome {
            PlatformOutcome::Skipped(r) | PlatformOutcome::Updated(r) | PlatformOutcome::Failed(r) => r,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, PlatformOutcome::Failed(_))
    }
}

impl fmt::Display for PlatformReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record();
        let version = match &record.build_number {
            Some(build) if self.platform.tracks_build_number() => {
                format!("{} ({})", record.version, build)
            }
            _ => record.version.clone(),
        };

        match &self.outcome {
            PlatformOutcome::Skipped(_) => write!(f, "{}: {} already current", self.platform, version),
            PlatformOutcome::Updated(_) => write!(f, "{}: downloaded {}", self.platform, version),
            PlatformOutcome::Failed(r) => write!(
                f,
                "{}: failed ({})",
                self.platform,
                r.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let skipped = PlatformReport::skipped(
            VersionRecord::new(Platform::MacOs, "7.5.1").with_build_number(Some("8994".into())),
        );
        assert_eq!(skipped.to_string(), "macOS: 7.5.1 (8994) already current");

        let failed = PlatformReport::failed(VersionRecord::unknown(Platform::Windows, "no link"));
        assert_eq!(failed.to_string(), "Windows: failed (no link)");
        assert!(failed.is_failure());
        assert!(!skipped.is_failure());
    }
}
