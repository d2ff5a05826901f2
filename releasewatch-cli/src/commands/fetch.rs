//! Fetch command - download one URL with the parallel engine.

use std::fs;
use std::path::{Path, PathBuf};

use releasewatch::download::{
    calculate_file_checksum, verify_checksum, DownloadMode, ParallelDownloadEngine,
};
use tracing::warn;

use super::common::{format_bytes, progress_bar_callback};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the fetch command.
pub struct FetchArgs<'a> {
    pub config_path: Option<&'a Path>,
    pub url: String,
    pub dest: PathBuf,
    pub workers: Option<usize>,
    pub chunk_size: Option<u64>,
    pub sha256: Option<String>,
    pub single: bool,
}

/// Run the fetch command.
pub fn run(args: FetchArgs<'_>) -> Result<(), CliError> {
    let runner = CliRunner::new(args.config_path)?;
    runner.log_startup("fetch");

    let mut download_config = runner.config().download_config();
    if let Some(workers) = args.workers {
        if workers == 0 {
            return Err(CliError::Config("--workers must be at least 1".to_string()));
        }
        download_config = download_config.with_workers(workers);
    }
    if let Some(chunk_size) = args.chunk_size {
        if chunk_size == 0 {
            return Err(CliError::Config("--chunk-size must be at least 1".to_string()));
        }
        let min_chunk_size = chunk_size.min(download_config.min_chunk_size);
        download_config = download_config
            .with_chunk_size(chunk_size)
            .with_min_chunk_size(min_chunk_size);
    }

    let engine = ParallelDownloadEngine::with_reqwest(download_config)?;
    let label = args
        .dest
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| args.url.clone());
    let progress = Some(progress_bar_callback(&label));

    let report = if args.single {
        engine.download_single_stream(&args.url, &args.dest, progress)?
    } else {
        engine.download(&args.url, &args.dest, progress)?
    };

    let hash = stamp(&report.path, args.sha256.as_deref())?;

    let mode = match report.mode {
        DownloadMode::Parallel { chunks } => format!("{} ranges", chunks),
        DownloadMode::SingleStream => "single stream".to_string(),
    };

    println!();
    println!("  Saved:   {}", report.path.display());
    println!("  Size:    {} ({})", format_bytes(report.bytes_written), mode);
    println!("  SHA-256: {}", hash);
    if args.sha256.is_some() {
        println!("  Checksum verified");
    }

    Ok(())
}

/// SHA-256 of `path`. With an expected digest, a mismatching file is
/// removed.
fn stamp(path: &Path, expected: Option<&str>) -> Result<String, CliError> {
    match expected {
        Some(expected) => {
            if let Err(e) = verify_checksum(path, expected) {
                discard(path);
                return Err(e.into());
            }
            Ok(expected.trim().to_ascii_lowercase())
        }
        None => Ok(calculate_file_checksum(path)?),
    }
}

/// Remove a download that failed verification.
fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!(path = %path.display(), error = %e, "Failed to remove rejected download");
    }
}
