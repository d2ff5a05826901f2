//! In-memory transport for tests.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use super::chunker::ByteRange;
use super::error::{DownloadError, DownloadResult};
use super::http::{OpenResponse, ProbeResponse, RangeTransport};

/// Serves byte buffers from memory, honoring `Range` requests.
///
/// The default resource (if any) is served for every URL that was not
/// registered explicitly; unknown URLs otherwise return 404.
pub struct MemoryTransport {
    default: Option<Vec<u8>>,
    resources: HashMap<String, Vec<u8>>,
    ignore_ranges: bool,
    report_length: bool,
    probe_status: Option<u16>,
    fail_first: Mutex<usize>,
    fail_start: Option<u64>,
    error_first: Mutex<usize>,
    truncate: Option<(u64, usize)>,
    latency: Duration,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    range_requests: Mutex<usize>,
    full_requests: Mutex<usize>,
    probed: Mutex<Vec<String>>,
}

impl MemoryTransport {
    /// Serve `data` for every URL.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            default: Some(data),
            ..Self::empty()
        }
    }

    /// Serve nothing until resources are registered.
    pub fn empty() -> Self {
        Self {
            default: None,
            resources: HashMap::new(),
            ignore_ranges: false,
            report_length: true,
            probe_status: None,
            fail_first: Mutex::new(0),
            fail_start: None,
            error_first: Mutex::new(0),
            truncate: None,
            latency: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            range_requests: Mutex::new(0),
            full_requests: Mutex::new(0),
            probed: Mutex::new(Vec::new()),
        }
    }

    /// Register a resource at a specific URL.
    pub fn with_resource(mut self, url: &str, data: Vec<u8>) -> Self {
        self.resources.insert(url.to_string(), data);
        self
    }

    /// Register a text page at a specific URL.
    pub fn with_page(self, url: &str, text: &str) -> Self {
        self.with_resource(url, text.as_bytes().to_vec())
    }

    /// Answer ranged requests with 200 and the full body.
    pub fn ignoring_ranges(mut self) -> Self {
        self.ignore_ranges = true;
        self
    }

    /// Omit `Content-Length` from probe responses.
    pub fn without_length(mut self) -> Self {
        self.report_length = false;
        self
    }

    /// Force a probe status for known resources.
    pub fn with_probe_status(mut self, status: u16) -> Self {
        self.probe_status = Some(status);
        self
    }

    /// Fail the first `n` ranged requests with 503.
    pub fn failing_first(self, n: usize) -> Self {
        *self.fail_first.lock() = n;
        self
    }

    /// Always fail ranged requests starting at `start`.
    pub fn failing_range_start(mut self, start: u64) -> Self {
        self.fail_start = Some(start);
        self
    }

    /// Fail the first `n` ranged requests with a transport error.
    pub fn erroring_first(self, n: usize) -> Self {
        *self.error_first.lock() = n;
        self
    }

    /// Answer ranged requests starting at `start` with a 206 body missing its
    /// last `missing` bytes.
    pub fn truncating_range_start(mut self, start: u64, missing: usize) -> Self {
        self.truncate = Some((start, missing));
        self
    }

    /// Hold every ranged request open for `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Most ranged requests ever open at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Number of ranged GET requests received.
    pub fn range_requests(&self) -> usize {
        *self.range_requests.lock()
    }

    /// Number of whole-body GET requests received.
    pub fn full_requests(&self) -> usize {
        *self.full_requests.lock()
    }

    /// URLs probed so far, in order.
    pub fn probed(&self) -> Vec<String> {
        self.probed.lock().clone()
    }

    fn lookup(&self, url: &str) -> Option<&Vec<u8>> {
        self.resources.get(url).or(self.default.as_ref())
    }

    fn respond(status: u16, body: Vec<u8>) -> OpenResponse {
        OpenResponse {
            status,
            body: Box::new(Cursor::new(body)),
        }
    }
}

impl RangeTransport for MemoryTransport {
    fn probe(&self, url: &str) -> DownloadResult<ProbeResponse> {
        self.probed.lock().push(url.to_string());

        Ok(match self.lookup(url) {
            Some(data) => ProbeResponse {
                status: self.probe_status.unwrap_or(200),
                content_length: self.report_length.then_some(data.len() as u64),
                accepts_ranges: !self.ignore_ranges,
            },
            None => ProbeResponse {
                status: 404,
                content_length: None,
                accepts_ranges: false,
            },
        })
    }

    fn open(&self, url: &str, range: Option<ByteRange>) -> DownloadResult<OpenResponse> {
        let Some(data) = self.lookup(url) else {
            return Ok(Self::respond(404, Vec::new()));
        };

        let Some(range) = range else {
            *self.full_requests.lock() += 1;
            return Ok(Self::respond(200, data.clone()));
        };

        *self.range_requests.lock() += 1;

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        let response = self.serve_range(url, data, range);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }
}

impl MemoryTransport {
    fn serve_range(&self, url: &str, data: &[u8], range: ByteRange) -> DownloadResult<OpenResponse> {
        {
            let mut remaining = self.error_first.lock();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(DownloadError::Http {
                    url: url.to_string(),
                    reason: "connection reset by peer".to_string(),
                });
            }
        }
        if self.fail_start == Some(range.start) {
            return Ok(Self::respond(503, Vec::new()));
        }
        {
            let mut remaining = self.fail_first.lock();
            if *remaining > 0 {
                *remaining -= 1;
                return Ok(Self::respond(503, Vec::new()));
            }
        }

        if self.ignore_ranges {
            return Ok(Self::respond(200, data.to_vec()));
        }

        let start = (range.start as usize).min(data.len());
        let mut end = (range.end as usize + 1).min(data.len());
        if let Some((truncated_start, missing)) = self.truncate {
            if truncated_start == range.start {
                end = end.saturating_sub(missing).max(start);
            }
        }
        Ok(Self::respond(206, data[start..end].to_vec()))
    }
}
