//! Error types for manifest resolution and package materialization.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for streamer operations.
pub type StreamerResult<T> = Result<T, StreamerError>;

/// Errors that can occur while resolving, downloading or archiving a manifest tree.
#[derive(Debug, Error)]
pub enum StreamerError {
    /// The HTTP request could not be performed (connection, TLS, timeout, body read).
    #[error("request to {url} failed: {reason}")]
    HttpFailed { url: String, reason: String },

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// A response body was not the expected JSON document.
    #[error("failed to parse response from {url}: {reason}")]
    ParseFailed { url: String, reason: String },

    /// An archive index timestamp was not in `YYYYMMDDHHMMSS` form.
    #[error("invalid snapshot timestamp '{0}'")]
    InvalidTimestamp(String),

    /// A downloaded payload does not hash to its declared identifier.
    #[error("checksum mismatch for {filename}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        filename: String,
        expected: String,
        actual: String,
    },

    /// Failed to read a file.
    #[error("failed to read {}: {source}", path.display())]
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to write a file.
    #[error("failed to write {}: {source}", path.display())]
    WriteFailed { path: PathBuf, source: io::Error },

    /// Failed to create a directory.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDirFailed { path: PathBuf, source: io::Error },

    /// Archive extraction failed.
    #[error("failed to extract {}: {reason}", path.display())]
    ExtractionFailed { path: PathBuf, reason: String },

    /// The platform token is not one of the recognized spellings.
    #[error("unknown platform '{0}' (expected one of: windows, win, osx, mac)")]
    UnknownPlatform(String),

    /// No live or archived manifest carries the requested build version.
    #[error("build version {version} of application {app_id} not found in archive history")]
    VersionNotFound { app_id: String, version: String },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StreamerError {
    /// Whether the error came from the network layer rather than local I/O or data.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::HttpFailed { .. } | Self::HttpStatus { .. })
    }
}
