//! Single byte-range fetcher with bounded retry.
//!
//! A fetcher writes exactly the bytes of its range at offset `range.start`
//! of a destination file that the engine has already sized. It opens its own
//! file descriptor per attempt and never truncates or resizes the file, so
//! fetchers working on disjoint ranges can run concurrently without locking.

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::thread;

use tracing::{debug, error, warn};

use super::chunker::ByteRange;
use super::error::{DownloadError, DownloadResult};
use super::http::RangeTransport;
use super::progress::ProgressCounters;
use super::retry::RetryPolicy;

/// Buffer size for streaming response bodies (16KB).
const BUFFER_SIZE: usize = 16 * 1024;

/// Fetches one byte range of a remote resource into a pre-sized file.
pub struct ChunkFetcher<'a> {
    transport: &'a dyn RangeTransport,
    url: &'a str,
    dest: &'a Path,
    retry: &'a RetryPolicy,
}

impl<'a> ChunkFetcher<'a> {
    /// Create a fetcher for `url` writing into `dest`.
    pub fn new(
        transport: &'a dyn RangeTransport,
        url: &'a str,
        dest: &'a Path,
        retry: &'a RetryPolicy,
    ) -> Self {
        Self {
            transport,
            url,
            dest,
            retry,
        }
    }

    /// Fetch `range`, retrying per the policy.
    ///
    /// `index` identifies the chunk in `counters`. Returns the number of bytes
    /// written, which always equals `range.len()` on success.
    pub fn fetch(
        &self,
        index: usize,
        range: ByteRange,
        counters: &ProgressCounters,
    ) -> DownloadResult<u64> {
        let max_attempts = self.retry.max_attempts();
        let mut attempt = 1;

        loop {
            match self.fetch_once(index, range, counters) {
                Ok(written) => {
                    debug!(chunk = %range, attempt, "Chunk complete");
                    counters.mark_completed(index);
                    return Ok(written);
                }
                Err(e) => {
                    counters.reset_chunk(index);

                    match self.retry.delay_for_attempt(attempt) {
                        Some(delay) => {
                            warn!(
                                chunk = %range,
                                attempt,
                                max_attempts,
                                error = %e,
                                "Chunk download failed, retrying"
                            );
                            thread::sleep(delay);
                            attempt += 1;
                        }
                        None => {
                            error!(
                                chunk = %range,
                                attempts = attempt,
                                error = %e,
                                "Chunk download failed permanently"
                            );
                            return Err(DownloadError::Chunk {
                                start: range.start,
                                end: range.end,
                                attempts: attempt,
                                reason: e.to_string(),
                            });
                        }
                    }
                }
            }
        }
    }

    /// One attempt: request the range and write it at its offset.
    fn fetch_once(
        &self,
        index: usize,
        range: ByteRange,
        counters: &ProgressCounters,
    ) -> DownloadResult<u64> {
        let response = self.transport.open(self.url, Some(range))?;
        if !response.is_content() {
            return Err(DownloadError::Http {
                url: self.url.to_string(),
                reason: format!("range request returned status {}", response.status),
            });
        }

        let mut body = response.body;

        // A 200 means the server ignored the Range header and sent the whole
        // resource; skip ahead to our offset.
        if response.status == 200 && range.start > 0 {
            let skipped = io::copy(&mut (&mut body).take(range.start), &mut io::sink())
                .map_err(|e| self.read_error(e))?;
            if skipped < range.start {
                return Err(self.short_body(range, 0));
            }
        }

        let mut file = OpenOptions::new()
            .write(true)
            .open(self.dest)
            .map_err(|e| self.write_error(e))?;
        file.seek(SeekFrom::Start(range.start))
            .map_err(|e| self.write_error(e))?;

        let mut writer = BufWriter::new(file);
        let mut limited = body.take(range.len());
        let mut buffer = vec![0u8; BUFFER_SIZE];
        let mut written = 0u64;

        loop {
            let bytes_read = limited.read(&mut buffer).map_err(|e| self.read_error(e))?;
            if bytes_read == 0 {
                break;
            }

            writer
                .write_all(&buffer[..bytes_read])
                .map_err(|e| self.write_error(e))?;

            written += bytes_read as u64;
            counters.add(index, bytes_read as u64);
        }

        writer.flush().map_err(|e| self.write_error(e))?;

        if written != range.len() {
            return Err(self.short_body(range, written));
        }

        Ok(written)
    }

    fn read_error(&self, e: io::Error) -> DownloadError {
        DownloadError::Http {
            url: self.url.to_string(),
            reason: format!("Read error: {}", e),
        }
    }

    fn write_error(&self, e: io::Error) -> DownloadError {
        DownloadError::Write {
            path: self.dest.to_path_buf(),
            source: e,
        }
    }

    fn short_body(&self, range: ByteRange, received: u64) -> DownloadError {
        DownloadError::Http {
            url: self.url.to_string(),
            reason: format!(
                "body ended early for {}: got {} of {} bytes",
                range,
                received,
                range.len()
            ),
        }
    }
}
