//! Version records and their identity keys.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Version string recorded when discovery fails.
pub const UNKNOWN_VERSION: &str = "Unknown";

/// Platforms an installer is published for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    MacOs,
}

impl Platform {
    /// All supported platforms, in crawl order.
    pub const ALL: [Platform; 2] = [Platform::Windows, Platform::MacOs];

    /// Lowercase identifier used for directories and file names.
    pub fn slug(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::MacOs => "macos",
        }
    }

    /// Whether releases on this platform carry a build number that is part
    /// of their identity.
    pub fn tracks_build_number(&self) -> bool {
        matches!(self, Platform::MacOs)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Windows => write!(f, "Windows"),
            Platform::MacOs => write!(f, "macOS"),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "windows" | "win" => Ok(Platform::Windows),
            "macos" | "mac" | "osx" => Ok(Platform::MacOs),
            other => Err(format!("unknown platform '{}'", other)),
        }
    }
}

/// Identity of a release within a platform's history.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionKey {
    pub platform: Platform,
    pub version: String,
    pub build_number: Option<String>,
}

/// One observed release (or a failed attempt to observe one).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub platform: Platform,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    pub update_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VersionRecord {
    /// Create a record for `version`, stamped with the current time.
    pub fn new(platform: Platform, version: impl Into<String>) -> Self {
        Self {
            platform,
            version: version.into(),
            build_number: None,
            release_date: None,
            download_url: None,
            update_time: Utc::now(),
            local_file: None,
            file_hash: None,
            error: None,
        }
    }

    /// Record of a failed discovery.
    pub fn unknown(platform: Platform, error: impl Into<String>) -> Self {
        Self::new(platform, UNKNOWN_VERSION).with_error(error)
    }

    pub fn with_build_number(mut self, build_number: Option<String>) -> Self {
        self.build_number = build_number;
        self
    }

    pub fn with_release_date(mut self, release_date: Option<NaiveDate>) -> Self {
        self.release_date = release_date;
        self
    }

    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        self.download_url = Some(url.into());
        self
    }

    pub fn with_update_time(mut self, update_time: DateTime<Utc>) -> Self {
        self.update_time = update_time;
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Identity key used for upsert matching.
    pub fn key(&self) -> VersionKey {
        VersionKey {
            platform: self.platform,
            version: self.version.clone(),
            build_number: self.build_number.clone(),
        }
    }

    /// Whether this record stands for a failed discovery.
    pub fn is_unknown(&self) -> bool {
        self.version == UNKNOWN_VERSION
    }
}
