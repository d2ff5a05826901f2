//! SHA-256 integrity stamps for downloaded installers.
//!
//! The stamp is recorded alongside each version record as a fingerprint.
//! When a publisher supplies a digest, [`verify_checksum`] compares against it.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use super::error::{DownloadError, DownloadResult};

/// Buffer size for reading files during checksum calculation (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Calculate the SHA-256 checksum of a file.
///
/// Returns the lowercase hexadecimal digest of the file contents.
pub fn calculate_file_checksum(path: &Path) -> DownloadResult<String> {
    let mut file = File::open(path).map_err(|e| DownloadError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer).map_err(|e| DownloadError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Verify that a file matches an expected checksum.
///
/// The comparison ignores ASCII case so publisher digests in upper case match.
pub fn verify_checksum(path: &Path, expected: &str) -> DownloadResult<()> {
    let actual = calculate_file_checksum(path)?;
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(DownloadError::ChecksumMismatch {
            filename: path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HELLO_WORLD_SHA256: &str =
        "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    fn installer(temp: &TempDir, contents: &[u8]) -> std::path::PathBuf {
        let path = temp.path().join("WPS_Office_12.1.0.21915.exe");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_known_digest() {
        let temp = TempDir::new().unwrap();
        let path = installer(&temp, b"hello world");

        assert_eq!(calculate_file_checksum(&path).unwrap(), HELLO_WORLD_SHA256);
    }

    #[test]
    fn test_empty_installer() {
        let temp = TempDir::new().unwrap();
        let path = installer(&temp, b"");

        assert_eq!(
            calculate_file_checksum(&path).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_streaming_matches_one_shot_digest() {
        // Spans several read buffers with a partial tail.
        let data: Vec<u8> = (0..BUFFER_SIZE * 3 + 17).map(|i| (i % 253) as u8).collect();
        let temp = TempDir::new().unwrap();
        let path = installer(&temp, &data);

        let expected = format!("{:x}", Sha256::digest(&data));
        assert_eq!(calculate_file_checksum(&path).unwrap(), expected);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let temp = TempDir::new().unwrap();
        let result = calculate_file_checksum(&temp.path().join("gone.zip"));
        assert!(matches!(result, Err(DownloadError::Read { .. })));
    }

    #[test]
    fn test_publisher_digest_matches_ignoring_case() {
        let temp = TempDir::new().unwrap();
        let path = installer(&temp, b"hello world");

        assert!(verify_checksum(&path, HELLO_WORLD_SHA256).is_ok());
        assert!(verify_checksum(&path, &format!(" {} ", HELLO_WORLD_SHA256.to_uppercase())).is_ok());
    }

    #[test]
    fn test_publisher_digest_mismatch() {
        let temp = TempDir::new().unwrap();
        let path = installer(&temp, b"tampered");

        match verify_checksum(&path, HELLO_WORLD_SHA256) {
            Err(DownloadError::ChecksumMismatch {
                filename, expected, ..
            }) => {
                assert_eq!(filename, "WPS_Office_12.1.0.21915.exe");
                assert_eq!(expected, HELLO_WORLD_SHA256);
            }
            other => panic!("expected ChecksumMismatch, got {:?}", other),
        }
    }
}
