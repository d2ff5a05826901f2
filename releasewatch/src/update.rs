//! Skip-or-download gate.
//!
//! [`decide`] compares a freshly discovered release against the newest
//! record in the ledger. It is pure: no I/O, no clock.

use crate::discovery::VersionDescriptor;
use crate::ledger::{Platform, VersionRecord};

/// Outcome of comparing a discovered release with the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateDecision {
    /// The discovered release is already recorded.
    Skip(VersionRecord),
    /// The release is new or changed and must be downloaded.
    Proceed,
}

impl UpdateDecision {
    pub fn is_skip(&self) -> bool {
        matches!(self, UpdateDecision::Skip(_))
    }
}

/// Decide whether `discovered` needs downloading.
///
/// Skips only when `current` exists and carries the same version, plus the
/// same build number on platforms whose releases are identified by one.
pub fn decide(
    platform: Platform,
    discovered: &VersionDescriptor,
    current: Option<&VersionRecord>,
) -> UpdateDecision {
    let Some(current) = current else {
        return UpdateDecision::Proceed;
    };

    let same_version = current.version == discovered.version;
    let same_build =
        !platform.tracks_build_number() || current.build_number == discovered.build_number;

    if same_version && same_build {
        UpdateDecision::Skip(current.clone())
    } else {
        UpdateDecision::Proceed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn windows_record(version: &str) -> VersionRecord {
        VersionRecord::new(Platform::Windows, version)
            .with_update_time(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
    }

    fn descriptor(version: &str, build: Option<&str>) -> VersionDescriptor {
        VersionDescriptor::new(version, "https://example.com/setup.exe")
            .with_build_number(build.map(str::to_string))
    }

    #[test]
    fn test_no_current_record_proceeds() {
        let decision = decide(Platform::Windows, &descriptor("21915", None), None);
        assert_eq!(decision, UpdateDecision::Proceed);
    }

    #[test]
    fn test_same_version_skips_new_version_proceeds() {
        let current = windows_record("21900");

        let same = decide(Platform::Windows, &descriptor("21900", None), Some(&current));
        assert_eq!(same, UpdateDecision::Skip(current.clone()));

        let newer = decide(Platform::Windows, &descriptor("21915", None), Some(&current));
        assert_eq!(newer, UpdateDecision::Proceed);
    }

    #[test]
    fn test_decision_is_idempotent() {
        let current = windows_record("21915");
        let found = descriptor("21915", None);

        let first = decide(Platform::Windows, &found, Some(&current));
        let second = decide(Platform::Windows, &found, Some(&current));

        assert!(first.is_skip());
        assert_eq!(first, second);
    }

    #[test]
    fn test_build_number_matters_on_macos() {
        let current = VersionRecord::new(Platform::MacOs, "7.5.1")
            .with_build_number(Some("8994".to_string()));

        let same = decide(Platform::MacOs, &descriptor("7.5.1", Some("8994")), Some(&current));
        assert!(same.is_skip());

        let rebuilt = decide(Platform::MacOs, &descriptor("7.5.1", Some("9001")), Some(&current));
        assert_eq!(rebuilt, UpdateDecision::Proceed);
    }

    #[test]
    fn test_build_number_ignored_on_windows() {
        let current = windows_record("21915").with_build_number(Some("1".to_string()));
        let decision = decide(Platform::Windows, &descriptor("21915", None), Some(&current));
        assert!(decision.is_skip());
    }
}
