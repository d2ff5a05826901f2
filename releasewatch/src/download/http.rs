//! HTTP transport abstraction for range downloads.
//!
//! The download engine talks to the network only through [`RangeTransport`],
//! which allows the engine, fetchers and discovery code to be tested against
//! an in-memory double.

use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_RANGES, CONTENT_LENGTH, RANGE, USER_AGENT,
};
use reqwest::StatusCode;

use super::chunker::ByteRange;
use super::error::{DownloadError, DownloadResult};

/// Default timeout for HTTP requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Desktop browser user agent sent with every request.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Result of a header-only metadata request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResponse {
    /// HTTP status code.
    pub status: u16,
    /// Reported `Content-Length`, if any.
    pub content_length: Option<u64>,
    /// Whether the server advertised `Accept-Ranges: bytes`.
    pub accepts_ranges: bool,
}

impl ProbeResponse {
    /// A probe is usable only when it returned 200 OK.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Total size of the resource, with "not reported" mapped to zero.
    pub fn total_size(&self) -> u64 {
        self.content_length.unwrap_or(0)
    }
}

/// An open response body.
pub struct OpenResponse {
    /// HTTP status code.
    pub status: u16,
    /// Streaming body reader.
    pub body: Box<dyn Read + Send>,
}

impl OpenResponse {
    /// Full (200) or partial (206) content.
    pub fn is_content(&self) -> bool {
        is_content_status(self.status)
    }
}

impl std::fmt::Debug for OpenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Trait for the network operations the downloader needs.
///
/// Implementations must be shareable across worker threads.
pub trait RangeTransport: Send + Sync {
    /// Issue a header-only request for `url`, following redirects.
    fn probe(&self, url: &str) -> DownloadResult<ProbeResponse>;

    /// Open `url` for reading, optionally restricted to `range`.
    fn open(&self, url: &str, range: Option<ByteRange>) -> DownloadResult<OpenResponse>;

    /// Fetch a whole response body as text.
    fn get_text(&self, url: &str) -> DownloadResult<String> {
        let mut response = self.open(url, None)?;
        if response.status != 200 {
            return Err(DownloadError::Http {
                url: url.to_string(),
                reason: format!("GET request failed with status {}", response.status),
            });
        }
        let mut text = String::new();
        response
            .body
            .read_to_string(&mut text)
            .map_err(|e| DownloadError::Http {
                url: url.to_string(),
                reason: format!("Read error: {}", e),
            })?;
        Ok(text)
    }
}

/// Real transport implementation using reqwest's blocking client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Create a transport with the default timeout.
    pub fn new() -> DownloadResult<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a transport with a custom per-request timeout.
    pub fn with_timeout(timeout: Duration) -> DownloadResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| DownloadError::ClientBuild(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    /// Configured request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn map_send_error(&self, url: &str, e: reqwest::Error) -> DownloadError {
        if e.is_timeout() {
            DownloadError::Timeout {
                url: url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            DownloadError::Http {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

impl RangeTransport for ReqwestTransport {
    fn probe(&self, url: &str) -> DownloadResult<ProbeResponse> {
        let response = self
            .client
            .head(url)
            .send()
            .map_err(|e| self.map_send_error(url, e))?;

        let content_length = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());

        let accepts_ranges = response
            .headers()
            .get(ACCEPT_RANGES)
            .map(|v| v.to_str().unwrap_or("") == "bytes")
            .unwrap_or(false);

        Ok(ProbeResponse {
            status: response.status().as_u16(),
            content_length,
            accepts_ranges,
        })
    }

    fn open(&self, url: &str, range: Option<ByteRange>) -> DownloadResult<OpenResponse> {
        let mut request = self.client.get(url);
        if let Some(range) = range {
            request = request.header(RANGE, range.header_value());
        }

        let response = request.send().map_err(|e| self.map_send_error(url, e))?;
        let status = response.status();

        Ok(OpenResponse {
            status: status.as_u16(),
            body: Box::new(response),
        })
    }
}

/// Whether a status code counts as content for a range request.
pub fn is_content_status(status: u16) -> bool {
    status == StatusCode::OK.as_u16() || status == StatusCode::PARTIAL_CONTENT.as_u16()
}
