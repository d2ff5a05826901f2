//! Download engine configuration.

use std::time::Duration;

use super::http::DEFAULT_TIMEOUT_SECS;
use super::retry::RetryPolicy;

/// Default number of concurrent range fetches.
pub const DEFAULT_WORKERS: usize = 16;

/// Default desired chunk size (6 MiB).
pub const DEFAULT_CHUNK_SIZE: u64 = 6 * 1024 * 1024;

/// Default minimum chunk size (1 MiB).
pub const DEFAULT_MIN_CHUNK_SIZE: u64 = 1024 * 1024;

/// Configuration for [`ParallelDownloadEngine`](super::ParallelDownloadEngine).
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Maximum number of range fetches in flight.
    pub workers: usize,

    /// Desired size of each range.
    pub chunk_size: u64,

    /// Lower bound for range size (the final range may be shorter).
    pub min_chunk_size: u64,

    /// Per-request HTTP timeout.
    pub timeout: Duration,

    /// Retry policy applied to each range.
    pub retry: RetryPolicy,

    /// Optional wall-clock budget for a whole download.
    ///
    /// When exceeded, no further ranges are started and the download fails
    /// through the normal cleanup path.
    pub deadline: Option<Duration>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            min_chunk_size: DEFAULT_MIN_CHUNK_SIZE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
            deadline: None,
        }
    }
}

impl DownloadConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of workers (minimum 1).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the desired chunk size.
    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the minimum chunk size.
    pub fn with_min_chunk_size(mut self, min_chunk_size: u64) -> Self {
        self.min_chunk_size = min_chunk_size;
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the per-range retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set an overall time budget for each download.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Worker count as the parallelism bound used for chunk sizing.
    pub fn max_parallelism(&self) -> u32 {
        u32::try_from(self.workers.max(1)).unwrap_or(u32::MAX)
    }
}
