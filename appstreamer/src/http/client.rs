//! Blocking reqwest implementation of [`HttpClient`].

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;

use super::HttpClient;
use crate::error::{StreamerError, StreamerResult};

/// Default timeout for HTTP requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Buffer size for streaming payload downloads (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Real HTTP client implementation using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
    timeout: Duration,
}

impl ReqwestClient {
    /// Creates a new client with the default timeout.
    pub fn new() -> StreamerResult<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> StreamerResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("appstreamer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StreamerError::HttpFailed {
                url: String::new(),
                reason: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, timeout })
    }

    /// The configured request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn send(&self, url: &str) -> StreamerResult<reqwest::blocking::Response> {
        let response = self.client.get(url).send().map_err(|e| {
            let reason = if e.is_timeout() {
                format!("timed out after {}s", self.timeout.as_secs())
            } else {
                e.to_string()
            };
            StreamerError::HttpFailed {
                url: url.to_string(),
                reason,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamerError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> StreamerResult<Vec<u8>> {
        self.send(url)?
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| StreamerError::HttpFailed {
                url: url.to_string(),
                reason: format!("failed to read response: {}", e),
            })
    }

    fn download_to(&self, url: &str, dest: &Path) -> StreamerResult<u64> {
        let mut response = self.send(url)?;

        let file = File::create(dest).map_err(|e| StreamerError::WriteFailed {
            path: dest.to_path_buf(),
            source: e,
        })?;
        let mut writer = BufWriter::new(file);
        let mut buffer = vec![0u8; BUFFER_SIZE];
        let mut downloaded = 0u64;

        loop {
            let bytes_read = response
                .read(&mut buffer)
                .map_err(|e| StreamerError::HttpFailed {
                    url: url.to_string(),
                    reason: format!("read error: {}", e),
                })?;

            if bytes_read == 0 {
                break;
            }

            writer
                .write_all(&buffer[..bytes_read])
                .map_err(|e| StreamerError::WriteFailed {
                    path: dest.to_path_buf(),
                    source: e,
                })?;

            downloaded += bytes_read as u64;
        }

        writer.flush().map_err(|e| StreamerError::WriteFailed {
            path: dest.to_path_buf(),
            source: e,
        })?;

        Ok(downloaded)
    }
}
