//! HTTP client abstraction for testability.
//!
//! Every network access in the crate goes through the [`HttpClient`] trait so
//! the whole manifest tree can be exercised against an in-memory client in
//! tests. The production implementation is [`ReqwestClient`].

mod client;

#[cfg(test)]
pub(crate) mod mock;

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{StreamerError, StreamerResult};

pub use client::{ReqwestClient, DEFAULT_TIMEOUT_SECS};

/// Trait for HTTP client operations.
///
/// Implementations must be shareable across threads: a single client is
/// handed down through the entire recursive application tree.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request and returns the response body.
    ///
    /// Non-success statuses are reported as [`StreamerError::HttpStatus`].
    fn get(&self, url: &str) -> StreamerResult<Vec<u8>>;

    /// Performs an HTTP GET request and writes the body to `dest`.
    ///
    /// Returns the number of bytes written. The default implementation buffers
    /// the body in memory; streaming clients should override it.
    fn download_to(&self, url: &str, dest: &Path) -> StreamerResult<u64> {
        let body = self.get(url)?;
        fs::write(dest, &body).map_err(|e| StreamerError::WriteFailed {
            path: dest.to_path_buf(),
            source: e,
        })?;
        Ok(body.len() as u64)
    }
}

/// Fetch `url` and decode the body as JSON.
pub fn get_json<T: DeserializeOwned>(client: &dyn HttpClient, url: &str) -> StreamerResult<T> {
    let body = client.get(url)?;
    serde_json::from_slice(&body).map_err(|e| StreamerError::ParseFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
