//! CLI error type.

use std::fmt;

use appstreamer::StreamerError;

/// Errors surfaced to the user by the CLI.
#[derive(Debug)]
pub enum CliError {
    /// Invalid or missing configuration.
    Config(String),
    /// Bad command-line input, reported before any network activity.
    Usage(String),
    /// Failure inside the library.
    Streamer(StreamerError),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Usage(msg) => write!(f, "{}", msg),
            CliError::Streamer(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Streamer(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StreamerError> for CliError {
    fn from(e: StreamerError) -> Self {
        match e {
            StreamerError::UnknownPlatform(_) => CliError::Usage(e.to_string()),
            StreamerError::Config(msg) => CliError::Config(msg),
            other => CliError::Streamer(other),
        }
    }
}
