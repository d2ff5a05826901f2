//! Progress reporting for chunked downloads.
//!
//! Fetcher threads bump lock-free per-chunk counters; an optional reporter
//! thread polls them and invokes a callback with aggregated numbers.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Progress callback for downloads.
///
/// # Arguments
///
/// * `bytes_downloaded` - Bytes written across all chunks
/// * `total_bytes` - Expected total size (0 when unknown)
/// * `chunks_completed` - Number of chunks fully written
/// * `total_chunks` - Total number of chunks
pub type DownloadProgressCallback = Box<dyn Fn(u64, u64, usize, usize) + Send + Sync>;

/// Default reporter poll interval.
const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Shared progress counters for a single download.
#[derive(Debug)]
pub struct ProgressCounters {
    chunk_progress: Vec<AtomicU64>,
    chunks_completed: AtomicUsize,
    done: AtomicBool,
}

impl ProgressCounters {
    /// Create counters for the given number of chunks.
    pub fn new(num_chunks: usize) -> Self {
        Self {
            chunk_progress: (0..num_chunks).map(|_| AtomicU64::new(0)).collect(),
            chunks_completed: AtomicUsize::new(0),
            done: AtomicBool::new(false),
        }
    }

    /// Number of tracked chunks.
    pub fn num_chunks(&self) -> usize {
        self.chunk_progress.len()
    }

    /// Total bytes written across all chunks.
    pub fn total_bytes(&self) -> u64 {
        self.chunk_progress
            .iter()
            .map(|p| p.load(Ordering::Relaxed))
            .sum()
    }

    /// Bytes written for one chunk.
    pub fn chunk_bytes(&self, index: usize) -> u64 {
        self.chunk_progress
            .get(index)
            .map(|p| p.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Number of completed chunks.
    pub fn completed_chunks(&self) -> usize {
        self.chunks_completed.load(Ordering::SeqCst)
    }

    /// Add freshly written bytes to a chunk.
    pub fn add(&self, index: usize, bytes: u64) {
        if let Some(p) = self.chunk_progress.get(index) {
            p.fetch_add(bytes, Ordering::Relaxed);
        }
    }

    /// Discard a chunk's progress before it is retried.
    pub fn reset_chunk(&self, index: usize) {
        if let Some(p) = self.chunk_progress.get(index) {
            p.store(0, Ordering::Relaxed);
        }
    }

    /// Mark a chunk as completed.
    pub fn mark_completed(&self, index: usize) {
        if index < self.chunk_progress.len() {
            self.chunks_completed.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Signal that the download is finished.
    pub fn signal_done(&self) {
        self.done.store(true, Ordering::SeqCst);
    }

    /// Check whether the download is finished.
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }
}

/// Background thread that periodically reports progress.
///
/// Dropping the reporter stops the thread after one final report.
pub struct ProgressReporter {
    handle: Option<JoinHandle<()>>,
    counters: Arc<ProgressCounters>,
}

impl ProgressReporter {
    /// Start a reporter that polls `counters` every `poll_interval`.
    pub fn start(
        counters: Arc<ProgressCounters>,
        total_size: u64,
        callback: Arc<DownloadProgressCallback>,
        poll_interval: Duration,
    ) -> Self {
        let counters_clone = Arc::clone(&counters);
        let total_chunks = counters.num_chunks();

        let handle = thread::spawn(move || {
            while !counters_clone.is_done() {
                callback(
                    counters_clone.total_bytes(),
                    total_size,
                    counters_clone.completed_chunks(),
                    total_chunks,
                );
                thread::sleep(poll_interval);
            }

            // Final report
            callback(
                counters_clone.total_bytes(),
                total_size,
                counters_clone.completed_chunks(),
                total_chunks,
            );
        });

        Self {
            handle: Some(handle),
            counters,
        }
    }

    /// Start a reporter with the default 100ms poll interval.
    pub fn start_default(
        counters: Arc<ProgressCounters>,
        total_size: u64,
        callback: Arc<DownloadProgressCallback>,
    ) -> Self {
        Self::start(
            counters,
            total_size,
            callback,
            Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        )
    }

    /// Stop the reporter and wait for it to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.counters.signal_done();
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.shutdown();
    }
}
