//! Resilient installer downloads.
//!
//! This module provides functionality for retrieving large installer files,
//! including:
//! - Byte-range planning (`chunker`)
//! - Per-range fetching with bounded retry (`fetcher`)
//! - Parallel orchestration with cleanup on failure (`engine`)
//! - Sequential fallback for unknown sizes (`stream`)
//! - SHA-256 integrity stamps (`checksum`)
//! - Real-time progress reporting (`progress`)
//!
//! # Architecture
//!
//! ```text
//! ParallelDownloadEngine
//!         │
//!         ├── RangeTransport (trait)
//!         │       └── ReqwestTransport
//!         │
//!         ├── plan_ranges ──► ByteRange*
//!         │
//!         ├── ChunkFetcher × workers (RetryPolicy)
//!         │
//!         ├── download_single (size unknown)
//!         │
//!         └── ProgressReporter (real-time updates)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use releasewatch::download::{DownloadConfig, ParallelDownloadEngine};
//!
//! let engine = ParallelDownloadEngine::with_reqwest(DownloadConfig::default())?;
//! let report = engine.download(
//!     "https://example.com/WPS_Setup_21915.exe",
//!     Path::new("downloads/windows/WPS_Office_21915.exe"),
//!     None,
//! )?;
//! println!("{} bytes", report.bytes_written);
//! ```

mod checksum;
mod chunker;
mod config;
mod engine;
mod error;
mod fetcher;
mod http;
mod progress;
mod retry;
mod stream;

#[cfg(test)]
pub(crate) mod testing;

pub use checksum::{calculate_file_checksum, verify_checksum};
pub use chunker::{effective_chunk_size, plan_ranges, ByteRange};
pub use config::{DownloadConfig, DEFAULT_CHUNK_SIZE, DEFAULT_MIN_CHUNK_SIZE, DEFAULT_WORKERS};
pub use engine::{ChunkOutcome, DownloadMode, DownloadReport, ParallelDownloadEngine};
pub use error::{DownloadError, DownloadResult};
pub use fetcher::ChunkFetcher;
pub use http::{
    is_content_status, OpenResponse, ProbeResponse, RangeTransport, ReqwestTransport,
    DEFAULT_TIMEOUT_SECS,
};
pub use progress::{DownloadProgressCallback, ProgressCounters, ProgressReporter};
pub use retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY_MS};
pub use stream::download_single;
