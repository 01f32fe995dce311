//! Shared session handed down through the manifest tree.
//!
//! A [`Session`] bundles the HTTP capability, the service endpoints and the
//! download settings. It is cheap to clone and carries no per-request state,
//! so the same session is shared by every node and package of a tree.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::endpoints::Endpoints;
use crate::error::{StreamerError, StreamerResult};
use crate::http::{self, HttpClient, ReqwestClient};

/// Settings controlling payload downloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    /// Whether to hash a payload after downloading it.
    pub verify_checksums: bool,

    /// Maximum concurrent payload downloads within one application node.
    ///
    /// `1` downloads sequentially.
    pub parallel_downloads: usize,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            verify_checksums: true,
            parallel_downloads: 1,
        }
    }
}

impl DownloadSettings {
    /// Enable or disable post-download checksum verification.
    pub fn with_verify_checksums(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }

    /// Set the maximum concurrent downloads (minimum 1).
    pub fn with_parallel_downloads(mut self, count: usize) -> Self {
        self.parallel_downloads = count.max(1);
        self
    }
}

/// Cloneable HTTP + endpoint capability.
#[derive(Clone)]
pub struct Session {
    http: Arc<dyn HttpClient>,
    endpoints: Arc<Endpoints>,
    settings: DownloadSettings,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("endpoints", &self.endpoints)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session around an existing HTTP client.
    pub fn new(http: Arc<dyn HttpClient>, endpoints: Endpoints) -> Self {
        Self {
            http,
            endpoints: Arc::new(endpoints),
            settings: DownloadSettings::default(),
        }
    }

    /// Create a session backed by a [`ReqwestClient`] talking to the default endpoints.
    pub fn with_defaults() -> StreamerResult<Self> {
        Ok(Self::new(Arc::new(ReqwestClient::new()?), Endpoints::default()))
    }

    /// Replace the download settings.
    pub fn with_settings(mut self, settings: DownloadSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn http(&self) -> &dyn HttpClient {
        self.http.as_ref()
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn settings(&self) -> &DownloadSettings {
        &self.settings
    }

    /// Fetch and decode a JSON document, live or as of an archive snapshot.
    pub fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        timestamp: Option<&str>,
    ) -> StreamerResult<T> {
        let target = self.endpoints.live_or_archived(url, timestamp);
        debug!(url = %target, "GET");
        http::get_json(self.http(), &target)
    }

    /// Ask the archive to capture `original_url`.
    ///
    /// The save endpoint is fire-and-forget: a non-success status is logged and
    /// ignored, while a transport failure still propagates.
    pub fn submit_to_archive(&self, original_url: &str) -> StreamerResult<()> {
        let save_url = self.endpoints.save_url(original_url);
        debug!(url = %save_url, "Submitting to archive");
        match self.http.get(&save_url) {
            Ok(_) => Ok(()),
            Err(StreamerError::HttpStatus { status, .. }) => {
                warn!(url = %original_url, status, "Archive save request was not accepted");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
