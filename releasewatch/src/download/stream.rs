//! Sequential whole-file download.
//!
//! Used when the server does not report a content length, so the file cannot
//! be split into ranges. Like the parallel path, a failed download never
//! leaves a partial file behind.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::time::Instant;

use tracing::{error, info};

use super::error::{DownloadError, DownloadResult};
use super::http::RangeTransport;
use super::progress::ProgressCounters;

/// Buffer size for streaming response bodies (16KB).
const BUFFER_SIZE: usize = 16 * 1024;

/// Stream the full body of `url` into `dest`.
///
/// Progress is reported against chunk 0 of `counters`. Returns the number of
/// bytes written. On any error the destination file is removed.
pub fn download_single(
    transport: &dyn RangeTransport,
    url: &str,
    dest: &Path,
    counters: &ProgressCounters,
    deadline: Option<Instant>,
) -> DownloadResult<u64> {
    info!(url, dest = %dest.display(), "Starting single-stream download");

    match stream_to_file(transport, url, dest, counters, deadline) {
        Ok(written) => {
            counters.mark_completed(0);
            info!(url, bytes = written, "Single-stream download complete");
            Ok(written)
        }
        Err(e) => {
            error!(url, error = %e, "Single-stream download failed");
            remove_partial(dest);
            Err(e)
        }
    }
}

fn stream_to_file(
    transport: &dyn RangeTransport,
    url: &str,
    dest: &Path,
    counters: &ProgressCounters,
    deadline: Option<Instant>,
) -> DownloadResult<u64> {
    let response = transport.open(url, None)?;
    if response.status != 200 {
        return Err(DownloadError::Http {
            url: url.to_string(),
            reason: format!("GET request failed with status {}", response.status),
        });
    }

    let file = File::create(dest).map_err(|e| DownloadError::Write {
        path: dest.to_path_buf(),
        source: e,
    })?;

    let mut body = response.body;
    let mut writer = BufWriter::new(file);
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut written = 0u64;

    loop {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return Err(DownloadError::DeadlineExceeded {
                    url: url.to_string(),
                });
            }
        }

        let bytes_read = body.read(&mut buffer).map_err(|e| DownloadError::Http {
            url: url.to_string(),
            reason: format!("Read error: {}", e),
        })?;

        if bytes_read == 0 {
            break;
        }

        writer
            .write_all(&buffer[..bytes_read])
            .map_err(|e| DownloadError::Write {
                path: dest.to_path_buf(),
                source: e,
            })?;

        written += bytes_read as u64;
        counters.add(0, bytes_read as u64);
    }

    writer.flush().map_err(|e| DownloadError::Write {
        path: dest.to_path_buf(),
        source: e,
    })?;

    Ok(written)
}

/// Remove a partially written destination, ignoring a missing file.
pub(crate) fn remove_partial(dest: &Path) {
    if dest.exists() {
        if let Err(e) = fs::remove_file(dest) {
            error!(path = %dest.display(), error = %e, "Failed to remove partial download");
        }
    }
}
