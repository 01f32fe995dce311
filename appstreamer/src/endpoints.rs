//! URL construction for the distribution and archival services.
//!
//! This module is the single source of truth for every URL the crate requests:
//! - Application manifests (`{base}/{os_id}/{app_id}/full.json`)
//! - Package manifests (`{base}/packages/{checksum}.json`)
//! - Payload archives (`{base}/packages/{content_hash}.tar.xz`)
//! - Archival retrieval, save and search endpoints

/// Default base URL of the distribution service.
pub const DEFAULT_DISTRIBUTION_BASE: &str = "https://dl.appstreaming.autodesk.com/production";

/// Default base URL of the web archive.
pub const DEFAULT_ARCHIVE_BASE: &str = "https://web.archive.org";

/// File extension of payload archives.
pub const PAYLOAD_EXTENSION: &str = "tar.xz";

/// Base URLs for the distribution service and the web archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    distribution_base: String,
    archive_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_DISTRIBUTION_BASE, DEFAULT_ARCHIVE_BASE)
    }
}

impl Endpoints {
    /// Create endpoints from two base URLs. Trailing slashes are ignored.
    pub fn new(distribution_base: impl Into<String>, archive_base: impl Into<String>) -> Self {
        Self {
            distribution_base: distribution_base.into().trim_end_matches('/').to_string(),
            archive_base: archive_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn distribution_base(&self) -> &str {
        &self.distribution_base
    }

    pub fn archive_base(&self) -> &str {
        &self.archive_base
    }

    /// Canonical URL of an application's root manifest.
    ///
    /// # Examples
    ///
    /// ```
    /// use appstreamer::Endpoints;
    ///
    /// let endpoints = Endpoints::new("https://dl.example.com/prod", "https://archive.example.org");
    /// assert_eq!(
    ///     endpoints.manifest_url("os1", "app1"),
    ///     "https://dl.example.com/prod/os1/app1/full.json"
    /// );
    /// ```
    pub fn manifest_url(&self, os_id: &str, app_id: &str) -> String {
        format!("{}/{}/{}/full.json", self.distribution_base, os_id, app_id)
    }

    /// URL of a package manifest, keyed by its checksum.
    pub fn package_manifest_url(&self, checksum: &str) -> String {
        format!("{}/packages/{}.json", self.distribution_base, checksum)
    }

    /// URL of a payload archive, keyed by its content hash.
    pub fn payload_url(&self, content_hash: &str) -> String {
        format!(
            "{}/packages/{}",
            self.distribution_base,
            payload_filename(content_hash)
        )
    }

    /// URL returning the byte-identical capture of `original_url` at `timestamp`.
    pub fn retrieval_url(&self, timestamp: &str, original_url: &str) -> String {
        format!("{}/web/{}id_/{}", self.archive_base, timestamp, original_url)
    }

    /// URL asking the archive to capture `original_url` now.
    pub fn save_url(&self, original_url: &str) -> String {
        format!("{}/save/{}", self.archive_base, original_url)
    }

    /// URL of the archive search index for successful captures of `original_url`.
    ///
    /// A positive `limit` returns the earliest captures, a negative one the
    /// most recent; either way rows come back in chronological order.
    pub fn search_url(&self, original_url: &str, limit: i64) -> String {
        format!(
            "{}/cdx/search?limit={}&filter=statuscode:200&output=json&url={}",
            self.archive_base, limit, original_url
        )
    }

    /// `url` itself when `timestamp` is `None`, otherwise its archival-retrieval URL.
    pub fn live_or_archived(&self, url: &str, timestamp: Option<&str>) -> String {
        match timestamp {
            Some(ts) => self.retrieval_url(ts, url),
            None => url.to_string(),
        }
    }
}

/// Local filename of a payload archive: `<content_hash>.tar.xz`.
pub fn payload_filename(content_hash: &str) -> String {
    format!("{}.{}", content_hash, PAYLOAD_EXTENSION)
}
