//! Error types for ledger persistence.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::record::Platform;

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors that can occur while persisting version history.
///
/// Reading a corrupt or missing ledger is not an error; see
/// [`VersionLedger::load`](super::VersionLedger::load).
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Failed to create the directory holding the ledger file.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    /// Failed to write or rename the ledger file.
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    /// The ledger could not be serialized.
    #[error("failed to serialize version history: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Only observed releases are recorded.
    #[error("refusing to record unknown {platform} version")]
    UnknownVersion { platform: Platform },
}
