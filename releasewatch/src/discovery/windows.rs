//! Windows release discovery.
//!
//! Strategies are tried in order and the first one that yields a reachable
//! installer wins:
//!
//! 1. Read the version from a software-index page, then probe the 64-bit
//!    and plain installer links.
//! 2. Probe the links of a known fallback version, plain first.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::{debug, info, warn};

use super::{cached_regex, Discovery, DiscoveryError, DiscoveryResult, VersionDescriptor};
use crate::download::RangeTransport;
use crate::ledger::Platform;

/// Default CDN directory holding Windows installers.
pub const DEFAULT_DOWNLOAD_BASE_URL: &str = "https://official-package.wpscdn.cn/wps/download";

/// Default software-index page listing the current version.
pub const DEFAULT_INDEX_URL: &str = "https://baoku.360.cn/soft/show/appid/104693057";

/// Last known good version.
pub const DEFAULT_FALLBACK_VERSION: &str = "21915";

static INDEX_VERSION: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

/// Windows discovery settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowsDiscoveryConfig {
    pub download_base_url: String,
    pub index_url: String,
    pub fallback_version: String,
}

impl Default for WindowsDiscoveryConfig {
    fn default() -> Self {
        Self {
            download_base_url: DEFAULT_DOWNLOAD_BASE_URL.to_string(),
            index_url: DEFAULT_INDEX_URL.to_string(),
            fallback_version: DEFAULT_FALLBACK_VERSION.to_string(),
        }
    }
}

/// Discovers the current Windows installer.
pub struct WindowsDiscovery {
    transport: Arc<dyn RangeTransport>,
    config: WindowsDiscoveryConfig,
}

impl WindowsDiscovery {
    pub fn new(transport: Arc<dyn RangeTransport>, config: WindowsDiscoveryConfig) -> Self {
        Self { transport, config }
    }

    fn installer_url(&self, variant: &str, version: &str) -> String {
        format!(
            "{}/WPS_Setup_{}{}.exe",
            self.config.download_base_url.trim_end_matches('/'),
            variant,
            version
        )
    }

    /// First candidate answering a probe with 200.
    fn first_reachable(&self, candidates: &[String]) -> Option<String> {
        candidates.iter().find_map(|url| match self.transport.probe(url) {
            Ok(probe) if probe.is_ok() => {
                debug!(url = %url, "Installer link verified");
                Some(url.clone())
            }
            Ok(probe) => {
                debug!(url = %url, status = probe.status, "Installer link unavailable");
                None
            }
            Err(e) => {
                debug!(url = %url, error = %e, "Installer link probe failed");
                None
            }
        })
    }

    fn from_software_index(&self) -> DiscoveryResult<VersionDescriptor> {
        let url = &self.config.index_url;
        let page = self
            .transport
            .get_text(url)
            .map_err(|source| DiscoveryError::Fetch {
                url: url.clone(),
                source,
            })?;

        let pattern = cached_regex(&INDEX_VERSION, r"版本\s+(\d+\.\d+\.\d+\.(\d+))")?;
        let captures = pattern
            .captures(&page)
            .ok_or_else(|| DiscoveryError::VersionNotFound { url: url.clone() })?;
        let full_version = &captures[1];
        let version = captures[2].to_string();
        info!(full_version, version = %version, "Found Windows version on software index");

        let candidates = [
            self.installer_url("X64_", &version),
            self.installer_url("", &version),
        ];
        let download_url =
            self.first_reachable(&candidates)
                .ok_or_else(|| DiscoveryError::NoInstallerUrl {
                    platform: Platform::Windows,
                    version: version.clone(),
                })?;

        Ok(VersionDescriptor::new(version, download_url))
    }

    fn from_fallback_version(&self) -> DiscoveryResult<VersionDescriptor> {
        let version = &self.config.fallback_version;
        info!(version = %version, "Trying known fallback version");

        let candidates = [
            self.installer_url("", version),
            self.installer_url("X64_", version),
        ];
        let download_url =
            self.first_reachable(&candidates)
                .ok_or_else(|| DiscoveryError::NoInstallerUrl {
                    platform: Platform::Windows,
                    version: version.clone(),
                })?;

        Ok(VersionDescriptor::new(version.clone(), download_url))
    }
}

impl Discovery for WindowsDiscovery {
    fn platform(&self) -> Platform {
        Platform::Windows
    }

    fn discover(&self) -> DiscoveryResult<VersionDescriptor> {
        let index_error = match self.from_software_index() {
            Ok(descriptor) => return Ok(descriptor),
            Err(e) => {
                warn!(error = %e, "Software index lookup failed");
                e
            }
        };

        self.from_fallback_version().map_err(|fallback_error| {
            warn!(error = %fallback_error, "Fallback version lookup failed");
            DiscoveryError::NotFound {
                platform: Platform::Windows,
                reason: format!("{}; {}", index_error, fallback_error),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::testing::MemoryTransport;

    const BASE: &str = "https://official-package.wpscdn.cn/wps/download";
    const INDEX_PAGE: &str = "<div class=\"info\">版本 12.1.0.21988 更新时间 2025-06-20</div>";

    fn discovery(transport: MemoryTransport) -> (Arc<MemoryTransport>, WindowsDiscovery) {
        let transport = Arc::new(transport);
        let discovery = WindowsDiscovery::new(transport.clone(), WindowsDiscoveryConfig::default());
        (transport, discovery)
    }

    #[test]
    fn test_index_version_prefers_x64() {
        let (transport, discovery) = discovery(
            MemoryTransport::empty()
                .with_page(DEFAULT_INDEX_URL, INDEX_PAGE)
                .with_resource(&format!("{}/WPS_Setup_X64_21988.exe", BASE), vec![0; 8])
                .with_resource(&format!("{}/WPS_Setup_21988.exe", BASE), vec![0; 8]),
        );

        let found = discovery.discover().unwrap();

        assert_eq!(found.version, "21988");
        assert_eq!(found.download_url, format!("{}/WPS_Setup_X64_21988.exe", BASE));
        assert_eq!(transport.probed().len(), 1);
    }

    #[test]
    fn test_index_version_falls_back_to_plain_link() {
        let (_, discovery) = discovery(
            MemoryTransport::empty()
                .with_page(DEFAULT_INDEX_URL, INDEX_PAGE)
                .with_resource(&format!("{}/WPS_Setup_21988.exe", BASE), vec![0; 8]),
        );

        let found = discovery.discover().unwrap();
        assert_eq!(found.download_url, format!("{}/WPS_Setup_21988.exe", BASE));
    }

    #[test]
    fn test_unreachable_index_uses_fallback_version() {
        let (transport, discovery) = discovery(
            MemoryTransport::empty()
                .with_resource(&format!("{}/WPS_Setup_X64_21915.exe", BASE), vec![0; 8]),
        );

        let found = discovery.discover().unwrap();

        assert_eq!(found.version, "21915");
        assert_eq!(found.download_url, format!("{}/WPS_Setup_X64_21915.exe", BASE));
        assert_eq!(
            transport.probed(),
            vec![
                format!("{}/WPS_Setup_21915.exe", BASE),
                format!("{}/WPS_Setup_X64_21915.exe", BASE),
            ]
        );
    }

    #[test]
    fn test_page_without_version_uses_fallback() {
        let (_, discovery) = discovery(
            MemoryTransport::empty()
                .with_page(DEFAULT_INDEX_URL, "<html>maintenance</html>")
                .with_resource(&format!("{}/WPS_Setup_21915.exe", BASE), vec![0; 8]),
        );

        assert_eq!(discovery.discover().unwrap().version, "21915");
    }

    #[test]
    fn test_nothing_reachable_is_not_found() {
        let (_, discovery) = discovery(MemoryTransport::empty().with_page(DEFAULT_INDEX_URL, INDEX_PAGE));

        match discovery.discover() {
            Err(DiscoveryError::NotFound { platform, .. }) => {
                assert_eq!(platform, Platform::Windows);
            }
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }
}
