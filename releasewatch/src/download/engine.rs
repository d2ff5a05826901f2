//! Parallel chunked download engine.
//!
//! Orchestrates a download end to end:
//!
//! ```text
//! probe (HEAD) ──► size known? ──no──► single stream
//!                      │
//!                     yes
//!                      ▼
//!        pre-allocate file ──► plan ranges ──► worker pool ──► join
//!                                                   │
//!                                   any chunk failed? ──► delete file
//! ```
//!
//! The worker pool is a fixed set of scoped threads pulling range indices
//! from a shared cursor, so at most `workers` fetches are in flight. Chunk
//! completion order does not matter; each range is written at its own offset.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tracing::{debug, error, info};

use super::chunker::{plan_ranges, ByteRange};
use super::config::DownloadConfig;
use super::error::{DownloadError, DownloadResult};
use super::fetcher::ChunkFetcher;
use super::http::{RangeTransport, ReqwestTransport};
use super::progress::{DownloadProgressCallback, ProgressCounters, ProgressReporter};
use super::stream::{download_single, remove_partial};

/// Result of fetching one range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkOutcome {
    /// The range that was fetched.
    pub range: ByteRange,
    /// Whether every byte of the range was written.
    pub success: bool,
    /// Bytes written for this range.
    pub bytes_written: u64,
}

/// How a completed download was performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMode {
    /// Split into ranges fetched concurrently.
    Parallel {
        /// Number of ranges.
        chunks: usize,
    },
    /// One sequential stream, used when the size is unknown.
    SingleStream,
}

/// Summary of a successful download.
#[derive(Debug, Clone)]
pub struct DownloadReport {
    /// Source URL.
    pub url: String,
    /// Destination path.
    pub path: PathBuf,
    /// Total bytes written to `path`.
    pub bytes_written: u64,
    /// Strategy used.
    pub mode: DownloadMode,
    /// Per-range outcomes (empty for single-stream downloads).
    pub chunks: Vec<ChunkOutcome>,
}

/// Parallel range downloader with single-stream fallback.
pub struct ParallelDownloadEngine {
    transport: Arc<dyn RangeTransport>,
    config: DownloadConfig,
}

impl std::fmt::Debug for ParallelDownloadEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelDownloadEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ParallelDownloadEngine {
    /// Create an engine over an arbitrary transport.
    pub fn new(transport: Arc<dyn RangeTransport>, config: DownloadConfig) -> Self {
        Self { transport, config }
    }

    /// Create an engine using the reqwest transport with the configured timeout.
    pub fn with_reqwest(config: DownloadConfig) -> DownloadResult<Self> {
        let transport = ReqwestTransport::with_timeout(config.timeout)?;
        Ok(Self::new(Arc::new(transport), config))
    }

    /// Engine configuration.
    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Underlying transport.
    pub fn transport(&self) -> &Arc<dyn RangeTransport> {
        &self.transport
    }

    /// Download `url` to `dest`.
    ///
    /// On success `dest` holds the complete resource. On failure `dest` does
    /// not exist.
    pub fn download(
        &self,
        url: &str,
        dest: &Path,
        on_progress: Option<DownloadProgressCallback>,
    ) -> DownloadResult<DownloadReport> {
        let deadline = self.config.deadline.map(|d| Instant::now() + d);

        let probe = self.transport.probe(url).map_err(|e| DownloadError::Probe {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        if !probe.is_ok() {
            error!(url, status = probe.status, "Probe failed");
            return Err(DownloadError::Probe {
                url: url.to_string(),
                reason: format!("HEAD request failed with status {}", probe.status),
            });
        }

        ensure_parent(dest)?;

        let total_size = probe.total_size();
        if total_size == 0 {
            debug!(url, "Content length unknown, falling back to single stream");
            return self.stream(url, dest, on_progress, deadline);
        }

        self.download_ranges(url, dest, total_size, on_progress, deadline)
    }

    /// Download `url` to `dest` as one sequential stream, skipping the probe.
    pub fn download_single_stream(
        &self,
        url: &str,
        dest: &Path,
        on_progress: Option<DownloadProgressCallback>,
    ) -> DownloadResult<DownloadReport> {
        ensure_parent(dest)?;
        let deadline = self.config.deadline.map(|d| Instant::now() + d);
        self.stream(url, dest, on_progress, deadline)
    }

    fn stream(
        &self,
        url: &str,
        dest: &Path,
        on_progress: Option<DownloadProgressCallback>,
        deadline: Option<Instant>,
    ) -> DownloadResult<DownloadReport> {
        let counters = Arc::new(ProgressCounters::new(1));
        let reporter = on_progress.map(|cb| {
            ProgressReporter::start_default(Arc::clone(&counters), 0, Arc::new(cb))
        });

        let result = download_single(self.transport.as_ref(), url, dest, &counters, deadline);
        drop(reporter);

        let bytes_written = result?;
        Ok(DownloadReport {
            url: url.to_string(),
            path: dest.to_path_buf(),
            bytes_written,
            mode: DownloadMode::SingleStream,
            chunks: Vec::new(),
        })
    }

    fn download_ranges(
        &self,
        url: &str,
        dest: &Path,
        total_size: u64,
        on_progress: Option<DownloadProgressCallback>,
        deadline: Option<Instant>,
    ) -> DownloadResult<DownloadReport> {
        preallocate(dest, total_size)?;

        let ranges = plan_ranges(
            total_size,
            self.config.chunk_size,
            self.config.max_parallelism(),
            self.config.min_chunk_size,
        );
        let workers = self.config.workers.max(1).min(ranges.len());

        info!(
            url,
            dest = %dest.display(),
            total_size,
            chunks = ranges.len(),
            workers,
            "Starting parallel download"
        );

        let counters = Arc::new(ProgressCounters::new(ranges.len()));
        let reporter = on_progress.map(|cb| {
            ProgressReporter::start_default(Arc::clone(&counters), total_size, Arc::new(cb))
        });

        let pool = self.run_pool(url, dest, &ranges, workers, &counters, deadline);
        drop(reporter);

        let PoolResult {
            outcomes,
            failed,
            timed_out,
        } = pool;
        if timed_out || failed > 0 {
            remove_partial(dest);

            if timed_out {
                error!(url, "Download exceeded its deadline");
                return Err(DownloadError::DeadlineExceeded {
                    url: url.to_string(),
                });
            }

            let succeeded = outcomes.iter().filter(|o| o.success).count();
            let skipped = ranges.len() - succeeded - failed;
            error!(url, failed, skipped, total = ranges.len(), "Download failed");
            return Err(DownloadError::Incomplete {
                failed,
                skipped,
                total: ranges.len(),
            });
        }

        let bytes_written = outcomes.iter().map(|o| o.bytes_written).sum();
        info!(url, bytes = bytes_written, "Parallel download complete");

        Ok(DownloadReport {
            url: url.to_string(),
            path: dest.to_path_buf(),
            bytes_written,
            mode: DownloadMode::Parallel {
                chunks: ranges.len(),
            },
            chunks: outcomes,
        })
    }

    /// Run fetchers over `ranges` with at most `workers` in flight.
    ///
    /// Stops handing out new ranges after the first failure or once the
    /// deadline passes. Ranges never started are unsuccessful in the
    /// outcomes but are not counted as failed.
    fn run_pool(
        &self,
        url: &str,
        dest: &Path,
        ranges: &[ByteRange],
        workers: usize,
        counters: &ProgressCounters,
        deadline: Option<Instant>,
    ) -> PoolResult {
        let cursor = AtomicUsize::new(0);
        let abort = AtomicBool::new(false);
        let timed_out = AtomicBool::new(false);
        let transport = self.transport.as_ref();
        let retry = &self.config.retry;

        let mut outcomes: Vec<ChunkOutcome> = ranges
            .iter()
            .map(|range| ChunkOutcome {
                range: *range,
                success: false,
                bytes_written: 0,
            })
            .collect();

        let finished: Vec<(usize, Option<u64>)> = thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    scope.spawn(|| {
                        let fetcher = ChunkFetcher::new(transport, url, dest, retry);
                        let mut done = Vec::new();

                        while !abort.load(Ordering::SeqCst) {
                            if deadline.is_some_and(|d| Instant::now() >= d) {
                                timed_out.store(true, Ordering::SeqCst);
                                abort.store(true, Ordering::SeqCst);
                                break;
                            }

                            let index = cursor.fetch_add(1, Ordering::SeqCst);
                            let Some(range) = ranges.get(index) else {
                                break;
                            };

                            match fetcher.fetch(index, *range, counters) {
                                Ok(written) => done.push((index, Some(written))),
                                Err(_) => {
                                    done.push((index, None));
                                    abort.store(true, Ordering::SeqCst);
                                }
                            }
                        }
                        done
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap_or_default())
                .collect()
        });

        let mut failed = 0;
        for (index, written) in finished {
            match written {
                Some(written) => {
                    outcomes[index].success = true;
                    outcomes[index].bytes_written = written;
                }
                None => failed += 1,
            }
        }

        PoolResult {
            outcomes,
            failed,
            timed_out: timed_out.load(Ordering::SeqCst),
        }
    }
}

/// What the worker pool did with each range.
struct PoolResult {
    outcomes: Vec<ChunkOutcome>,
    /// Ranges attempted and given up on.
    failed: usize,
    timed_out: bool,
}

fn ensure_parent(dest: &Path) -> DownloadResult<()> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| DownloadError::CreateDir {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

/// Create `dest` with exactly `size` bytes.
fn preallocate(dest: &Path, size: u64) -> DownloadResult<()> {
    let result = File::create(dest).and_then(|file| file.set_len(size));
    result.map_err(|e| {
        remove_partial(dest);
        DownloadError::Write {
            path: dest.to_path_buf(),
            source: e,
        }
    })
}
