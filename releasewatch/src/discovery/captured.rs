//! Installer links collected while scanning a page.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use super::{cached_regex, DiscoveryResult};

/// Host fragment every accepted installer link must contain.
const CDN_HOST: &str = "wpscdn.cn";

/// Installer file appended to directory links.
const DIRECTORY_INSTALLER: &str = "WPS_Office_Installer.zip";

static URL_PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

/// Candidate links found during one discovery call.
///
/// A fresh set is built for every call, so results from one attempt never
/// leak into the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedUrls {
    urls: BTreeSet<String>,
}

impl CapturedUrls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every absolute http(s) link on the CDN host from `text`.
    pub fn scan(text: &str) -> DiscoveryResult<Self> {
        let pattern = cached_regex(&URL_PATTERN, r#"https?://[^\s"'<>()\\]+"#)?;
        let mut captured = Self::new();
        for m in pattern.find_iter(text) {
            captured.insert(m.as_str());
        }
        Ok(captured)
    }

    /// Record a link if it points at the CDN.
    pub fn insert(&mut self, url: &str) {
        if url.contains(CDN_HOST) {
            self.urls.insert(url.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }

    /// Best installer link: a `.zip` file, else a directory link joined
    /// with the default installer name.
    pub fn installer_url(&self) -> Option<String> {
        if let Some(zip) = self.iter().find(|u| u.ends_with(".zip")) {
            return Some(zip.to_string());
        }
        self.iter()
            .find(|u| u.ends_with('/'))
            .map(|dir| format!("{}/{}", dir.trim_end_matches('/'), DIRECTORY_INSTALLER))
    }
}
