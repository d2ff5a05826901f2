//! Error types for the download engine.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for download operations.
pub type DownloadResult<T> = Result<T, DownloadError>;

/// Errors that can occur while downloading an installer.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The metadata probe did not succeed; size and reachability are unknown.
    #[error("probe of {url} failed: {reason}")]
    Probe { url: String, reason: String },

    /// A single byte range exhausted its retry budget.
    #[error("chunk {start}-{end} failed after {attempts} attempts: {reason}")]
    Chunk {
        start: u64,
        end: u64,
        attempts: u32,
        reason: String,
    },

    /// One or more chunks failed, so the whole file was discarded.
    ///
    /// `skipped` counts chunks never started because the download was
    /// abandoned after the first failure.
    #[error("{failed} of {total} chunks failed to download ({skipped} not attempted)")]
    Incomplete {
        failed: usize,
        skipped: usize,
        total: usize,
    },

    /// A request was sent but the transfer itself failed.
    #[error("failed to download {url}: {reason}")]
    Http { url: String, reason: String },

    /// The request exceeded the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// The overall download budget ran out before the file was complete.
    #[error("download of {url} exceeded its deadline")]
    DeadlineExceeded { url: String },

    /// Failed to write to the destination file.
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    /// Failed to read a local file.
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    /// Failed to create the destination directory.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    /// The downloaded file does not match the published digest.
    #[error("checksum mismatch for {filename}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        filename: String,
        expected: String,
        actual: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl DownloadError {
    /// Whether this error happened on the local filesystem rather than the network.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Write { .. } | Self::Read { .. } | Self::CreateDir { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_error_display() {
        let err = DownloadError::Chunk {
            start: 0,
            end: 1023,
            attempts: 3,
            reason: "connection reset".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "chunk 0-1023 failed after 3 attempts: connection reset"
        );
    }

    #[test]
    fn test_checksum_mismatch_display() {
        let err = DownloadError::ChecksumMismatch {
            filename: "WPS_Office_21915.exe".to_string(),
            expected: "abc123".to_string(),
            actual: "def456".to_string(),
        };
        assert!(err.to_string().contains("checksum mismatch"));
        assert!(err.to_string().contains("abc123"));
        assert!(err.to_string().contains("def456"));
    }

    #[test]
    fn test_is_local() {
        let write = DownloadError::Write {
            path: PathBuf::from("/tmp/x"),
            source: io::Error::other("disk full"),
        };
        assert!(write.is_local());

        let probe = DownloadError::Probe {
            url: "http://example.com".to_string(),
            reason: "404".to_string(),
        };
        assert!(!probe.is_local());
    }
}
