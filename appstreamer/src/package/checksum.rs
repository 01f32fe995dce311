//! SHA-1 content verification for payload archives.
//!
//! A payload's identifier is the SHA-1 of its bytes, so the name of a
//! downloaded file is also its integrity check.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha1::{Digest, Sha1};

use crate::error::{StreamerError, StreamerResult};

/// Buffer size for reading files during checksum calculation (128KB).
const BUFFER_SIZE: usize = 128 * 1024;

/// Calculate the SHA-1 checksum of a file without buffering it whole.
///
/// Returns the lowercase hexadecimal digest.
pub fn calculate_file_checksum(path: &Path) -> StreamerResult<String> {
    let mut file = File::open(path).map_err(|e| StreamerError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut hasher = Sha1::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| StreamerError::ReadFailed {
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

/// Case-insensitive digest comparison.
pub fn checksums_match(actual: &str, expected: &str) -> bool {
    actual.eq_ignore_ascii_case(expected)
}

/// Whether `path` exists and hashes to `expected`.
pub fn is_verified(path: &Path, expected: &str) -> StreamerResult<bool> {
    if !path.is_file() {
        return Ok(false);
    }
    let actual = calculate_file_checksum(path)?;
    Ok(checksums_match(&actual, expected))
}

/// Verify that a file matches an expected checksum.
pub fn verify_checksum(path: &Path, expected: &str) -> StreamerResult<()> {
    let actual = calculate_file_checksum(path)?;
    if !checksums_match(&actual, expected) {
        return Err(StreamerError::ChecksumMismatch {
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
