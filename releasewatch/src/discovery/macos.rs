//! macOS release discovery.
//!
//! The download page shows the version in one of several formats:
//!
//! | Format                | Example                  | Build |
//! |-----------------------|--------------------------|-------|
//! | version/release date  | `12.1.21861/2025.06.20`  | `0`   |
//! | version(build)        | `7.5.1(8994)`            | 8994  |
//! | bare version          | `7.2.1`                  | `0`   |
//!
//! Installer links on the page are gathered into a [`CapturedUrls`] set.

use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::Duration;

use chrono::NaiveDate;
use regex::Regex;
use tracing::{info, warn};

use super::captured::CapturedUrls;
use super::{cached_regex, Discovery, DiscoveryError, DiscoveryResult, VersionDescriptor};
use crate::download::{RangeTransport, RetryPolicy};
use crate::ledger::Platform;
use crate::naming::DEFAULT_BUILD_NUMBER;

/// Default macOS download page.
pub const DEFAULT_PAGE_URL: &str = "https://mac.wps.cn";

/// Attempts made before giving up on the page.
pub const DEFAULT_PAGE_ATTEMPTS: u32 = 3;

/// Pause between page attempts.
pub const DEFAULT_PAGE_RETRY_DELAY: Duration = Duration::from_secs(5);

static DATED_VERSION: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
static BUILD_VERSION: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
static BARE_VERSION: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
static RELEASE_DATE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

/// macOS discovery settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MacDiscoveryConfig {
    pub page_url: String,
    pub retry: RetryPolicy,
}

impl Default for MacDiscoveryConfig {
    fn default() -> Self {
        Self {
            page_url: DEFAULT_PAGE_URL.to_string(),
            retry: RetryPolicy::fixed(DEFAULT_PAGE_ATTEMPTS, DEFAULT_PAGE_RETRY_DELAY),
        }
    }
}

/// Version fields read from page text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVersion {
    pub version: String,
    pub build_number: String,
    pub release_date: Option<NaiveDate>,
}

/// Parse version, build number and release date out of `text`.
///
/// Returns `Ok(None)` when no format matches.
pub fn parse_version_text(text: &str) -> DiscoveryResult<Option<ParsedVersion>> {
    let dated = cached_regex(&DATED_VERSION, r"(\d+\.\d+\.\d+)/(\d{4}\.\d{1,2}\.\d{1,2})")?;
    let with_build = cached_regex(&BUILD_VERSION, r"(\d+\.\d+\.\d+)\((\d+)\)")?;
    let bare = cached_regex(&BARE_VERSION, r"(\d+\.\d+\.\d+)")?;
    let date = cached_regex(&RELEASE_DATE, r"[/\s](\d{4}\.\d{1,2}\.\d{1,2})")?;

    let release_date = date.captures(text).and_then(|c| parse_dotted_date(&c[1]));

    if let Some(c) = dated.captures(text) {
        return Ok(Some(ParsedVersion {
            version: c[1].to_string(),
            build_number: DEFAULT_BUILD_NUMBER.to_string(),
            release_date: parse_dotted_date(&c[2]).or(release_date),
        }));
    }

    if let Some(c) = with_build.captures(text) {
        return Ok(Some(ParsedVersion {
            version: c[1].to_string(),
            build_number: c[2].to_string(),
            release_date,
        }));
    }

    Ok(bare.captures(text).map(|c| ParsedVersion {
        version: c[1].to_string(),
        build_number: DEFAULT_BUILD_NUMBER.to_string(),
        release_date,
    }))
}

/// `2025.06.20` -> 2025-06-20
fn parse_dotted_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y.%m.%d").ok()
}

/// Discovers the current macOS installer.
pub struct MacDiscovery {
    transport: Arc<dyn RangeTransport>,
    config: MacDiscoveryConfig,
}

impl MacDiscovery {
    pub fn new(transport: Arc<dyn RangeTransport>, config: MacDiscoveryConfig) -> Self {
        Self { transport, config }
    }

    fn attempt(&self) -> DiscoveryResult<VersionDescriptor> {
        let url = &self.config.page_url;
        let page = self
            .transport
            .get_text(url)
            .map_err(|source| DiscoveryError::Fetch {
                url: url.clone(),
                source,
            })?;

        let parsed = parse_version_text(&page)?
            .ok_or_else(|| DiscoveryError::VersionNotFound { url: url.clone() })?;
        info!(
            version = %parsed.version,
            build = %parsed.build_number,
            release_date = ?parsed.release_date,
            "Found macOS version"
        );

        let captured = CapturedUrls::scan(&page)?;
        let download_url =
            captured
                .installer_url()
                .ok_or_else(|| DiscoveryError::NoInstallerUrl {
                    platform: Platform::MacOs,
                    version: parsed.version.clone(),
                })?;

        Ok(VersionDescriptor::new(parsed.version, download_url)
            .with_build_number(Some(parsed.build_number))
            .with_release_date(parsed.release_date))
    }
}

impl Discovery for MacDiscovery {
    fn platform(&self) -> Platform {
        Platform::MacOs
    }

    fn discover(&self) -> DiscoveryResult<VersionDescriptor> {
        let mut attempt = 1;
        loop {
            match self.attempt() {
                Ok(descriptor) => return Ok(descriptor),
                Err(e) => match self.config.retry.delay_for_attempt(attempt) {
                    Some(delay) => {
                        warn!(attempt, error = %e, "macOS discovery failed, retrying");
                        thread::sleep(delay);
                        attempt += 1;
                    }
                    None => {
                        return Err(DiscoveryError::NotFound {
                            platform: Platform::MacOs,
                            reason: e.to_string(),
                        })
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::testing::MemoryTransport;

    const PAGE: &str = r#"<div class="version">12.1.21861/2025.06.20</div>
        <a class="download" href="https://package.mac.wpscdn.cn/mac_wps_pkg/12.1.21861/WPS_Office_Installer.zip">立即下载</a>"#;

    fn quick_config() -> MacDiscoveryConfig {
        MacDiscoveryConfig {
            page_url: DEFAULT_PAGE_URL.to_string(),
            retry: RetryPolicy::fixed(2, Duration::from_millis(1)),
        }
    }

    #[test]
    fn test_parse_dated_format() {
        let parsed = parse_version_text("12.1.21861/2025.06.20").unwrap().unwrap();
        assert_eq!(parsed.version, "12.1.21861");
        assert_eq!(parsed.build_number, "0");
        assert_eq!(parsed.release_date, NaiveDate::from_ymd_opt(2025, 6, 20));
    }

    #[test]
    fn test_parse_build_format() {
        let parsed = parse_version_text("最新版本 7.5.1(8994)").unwrap().unwrap();
        assert_eq!(parsed.version, "7.5.1");
        assert_eq!(parsed.build_number, "8994");
        assert_eq!(parsed.release_date, None);
    }

    #[test]
    fn test_parse_bare_format_with_separate_date() {
        let parsed = parse_version_text("版本 7.2.1 发布于 2024.11.02").unwrap().unwrap();
        assert_eq!(parsed.version, "7.2.1");
        assert_eq!(parsed.build_number, "0");
        assert_eq!(parsed.release_date, NaiveDate::from_ymd_opt(2024, 11, 2));
    }

    #[test]
    fn test_parse_no_version() {
        assert_eq!(parse_version_text("coming soon").unwrap(), None);
    }

    #[test]
    fn test_discover_from_page() {
        let transport = Arc::new(MemoryTransport::empty().with_page(DEFAULT_PAGE_URL, PAGE));
        let discovery = MacDiscovery::new(transport, quick_config());

        let found = discovery.discover().unwrap();

        assert_eq!(found.version, "12.1.21861");
        assert_eq!(found.build_number.as_deref(), Some("0"));
        assert_eq!(found.release_date, NaiveDate::from_ymd_opt(2025, 6, 20));
        assert_eq!(
            found.download_url,
            "https://package.mac.wpscdn.cn/mac_wps_pkg/12.1.21861/WPS_Office_Installer.zip"
        );
    }

    #[test]
    fn test_page_without_link_retries_then_fails() {
        let transport = Arc::new(
            MemoryTransport::empty().with_page(DEFAULT_PAGE_URL, "<p>7.5.1(8994)</p>"),
        );
        let discovery = MacDiscovery::new(transport, quick_config());

        match discovery.discover() {
            Err(DiscoveryError::NotFound { platform, reason }) => {
                assert_eq!(platform, Platform::MacOs);
                assert!(reason.contains("7.5.1"));
            }
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }
}
