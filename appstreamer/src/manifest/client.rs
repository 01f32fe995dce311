//! Fetching root and package manifests.

use tracing::info;

use super::types::{Manifest, PackageManifest};
use crate::error::StreamerResult;
use crate::session::Session;

/// Fetches manifests live or as of an archive snapshot.
#[derive(Debug, Clone)]
pub struct ManifestClient {
    session: Session,
}

impl ManifestClient {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Canonical URL of the root manifest for `(app_id, os_id)`.
    pub fn manifest_url(&self, app_id: &str, os_id: &str) -> String {
        self.session.endpoints().manifest_url(os_id, app_id)
    }

    /// Fetch and decode an application's root manifest.
    ///
    /// With a `snapshot_timestamp` the manifest is requested through the
    /// archival-retrieval URL instead of live.
    pub fn fetch(
        &self,
        app_id: &str,
        os_id: &str,
        snapshot_timestamp: Option<&str>,
    ) -> StreamerResult<Manifest> {
        let url = self.manifest_url(app_id, os_id);
        match snapshot_timestamp {
            Some(ts) => info!(app_id, snapshot = ts, "Fetching archived manifest"),
            None => info!(app_id, "Fetching manifest"),
        }
        self.session.get_json(&url, snapshot_timestamp)
    }

    /// Fetch and decode one package manifest by checksum.
    pub fn fetch_package(
        &self,
        checksum: &str,
        snapshot_timestamp: Option<&str>,
    ) -> StreamerResult<PackageManifest> {
        let url = self.session.endpoints().package_manifest_url(checksum);
        info!(checksum, "Getting package manifest");
        self.session.get_json(&url, snapshot_timestamp)
    }
}
