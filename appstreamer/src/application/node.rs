//! The application tree.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use super::info::ApplicationInfo;
use super::population::Population;
use super::versions::AvailableVersions;
use crate::archive::SnapshotIndex;
use crate::error::{StreamerError, StreamerResult};
use crate::manifest::{Manifest, ManifestClient};
use crate::package::{
    fetch_all, ArchiveExtractor, DownloadSummary, PackageDescriptor, PackageInfo, PayloadJob,
    TarXzExtractor,
};
use crate::session::Session;

/// Work applied to each node of a walk.
pub(crate) type Visitor<'a> = dyn FnMut(&mut ApplicationNode) -> StreamerResult<()> + 'a;

/// One application of the vendor tree, built from `(app_id, os_id)`.
///
/// The manifest is fetched on construction and never changes. Packages and
/// sub-applications are fetched on first use, all at once, and only once.
/// A node pinned to an archive snapshot fetches everything below it through
/// the archive at that timestamp.
#[derive(Debug)]
pub struct ApplicationNode {
    app_id: String,
    os_id: String,
    snapshot: Option<String>,
    manifest: Manifest,
    session: Session,
    packages: Population<PackageDescriptor>,
    sub_applications: Population<ApplicationNode>,
}

impl ApplicationNode {
    /// Fetch the live manifest of `(app_id, os_id)`.
    pub fn new(
        session: Session,
        app_id: impl Into<String>,
        os_id: impl Into<String>,
    ) -> StreamerResult<Self> {
        Self::fetch(session, app_id.into(), os_id.into(), None)
    }

    /// Fetch the manifest of `(app_id, os_id)` as captured at `timestamp`.
    pub fn at_snapshot(
        session: Session,
        app_id: impl Into<String>,
        os_id: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> StreamerResult<Self> {
        Self::fetch(session, app_id.into(), os_id.into(), Some(timestamp.into()))
    }

    /// Find the node whose manifest carries build `version`.
    ///
    /// The live manifest wins when it matches; otherwise up to `search_limit`
    /// archive captures are scanned oldest first and the first match is
    /// returned pinned to its capture.
    ///
    /// # Arguments
    ///
    /// * `session` - Session shared by the returned node and its children
    /// * `app_id` - Application id
    /// * `os_id` - Vendor OS id of the platform
    /// * `version` - Build version to look for
    /// * `search_limit` - Maximum number of archive captures to scan
    ///
    /// # Returns
    ///
    /// The live node, or a node pinned to the first matching capture.
    ///
    /// # Errors
    ///
    /// Returns [`StreamerError::VersionNotFound`] when no scanned manifest
    /// carries `version`, and propagates transport and parse failures.
    pub fn at_build_version(
        session: Session,
        app_id: &str,
        os_id: &str,
        version: &str,
        search_limit: usize,
    ) -> StreamerResult<Self> {
        let live = Self::new(session.clone(), app_id, os_id)?;
        if live.build_version() == version {
            return Ok(live);
        }

        let client = ManifestClient::new(session.clone());
        let index = SnapshotIndex::new(session.clone());
        let limit = i64::try_from(search_limit).unwrap_or(i64::MAX);

        for snapshot in index.list_snapshots(&live.manifest_url(), limit)? {
            let snapshot = snapshot?;
            let manifest = client.fetch(app_id, os_id, Some(snapshot.raw_timestamp()))?;
            if manifest.build_version == version {
                info!(app_id, version, snapshot = snapshot.raw_timestamp(), "Found archived build");
                return Ok(Self::from_manifest(
                    session,
                    app_id,
                    os_id,
                    Some(snapshot.raw_timestamp().to_string()),
                    manifest,
                ));
            }
        }

        Err(StreamerError::VersionNotFound {
            app_id: app_id.to_string(),
            version: version.to_string(),
        })
    }

    /// Wrap an already fetched manifest.
    pub fn from_manifest(
        session: Session,
        app_id: impl Into<String>,
        os_id: impl Into<String>,
        snapshot: Option<String>,
        manifest: Manifest,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            os_id: os_id.into(),
            snapshot,
            manifest,
            session,
            packages: Population::Unfetched,
            sub_applications: Population::Unfetched,
        }
    }

    fn fetch(
        session: Session,
        app_id: String,
        os_id: String,
        snapshot: Option<String>,
    ) -> StreamerResult<Self> {
        let manifest =
            ManifestClient::new(session.clone()).fetch(&app_id, &os_id, snapshot.as_deref())?;
        Ok(Self::from_manifest(session, app_id, os_id, snapshot, manifest))
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn os_id(&self) -> &str {
        &self.os_id
    }

    /// Archive timestamp this node is pinned to, `None` when live.
    pub fn snapshot_timestamp(&self) -> Option<&str> {
        self.snapshot.as_deref()
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn build_version(&self) -> &str {
        &self.manifest.build_version
    }

    pub fn display_name(&self) -> &str {
        &self.manifest.properties.display_name
    }

    /// Canonical live URL of this node's manifest.
    pub fn manifest_url(&self) -> String {
        self.session
            .endpoints()
            .manifest_url(&self.os_id, &self.app_id)
    }

    /// Packages, if already fetched.
    pub fn packages(&self) -> Option<&[PackageDescriptor]> {
        self.packages.get()
    }

    /// Sub-applications, if already fetched.
    pub fn sub_applications(&self) -> Option<&[ApplicationNode]> {
        self.sub_applications.get()
    }

    /// Fetch every declared package manifest unless already done.
    ///
    /// Either all packages are fetched or, on error, none are kept.
    pub fn populate_packages(&mut self) -> StreamerResult<&[PackageDescriptor]> {
        let client = ManifestClient::new(self.session.clone());
        let manifest = &self.manifest;
        let snapshot = self.snapshot.as_deref();

        self.packages.fill_with(|| {
            manifest
                .packages
                .iter()
                .map(|r| PackageDescriptor::fetch(&client, &r.checksum, snapshot))
                .collect()
        })?;
        Ok(self.packages.items())
    }

    /// Submit every package manifest URL to the archive, then populate.
    pub fn populate_packages_archiving(&mut self) -> StreamerResult<&[PackageDescriptor]> {
        for r in &self.manifest.packages {
            let url = self.session.endpoints().package_manifest_url(&r.checksum);
            info!(checksum = %r.checksum, "Archiving package manifest");
            self.session.submit_to_archive(&url)?;
        }
        self.populate_packages()
    }

    /// Build the declared sub-application nodes unless already done.
    ///
    /// A manifest without a sub-applications field yields an empty, fetched list.
    pub fn populate_sub_applications(&mut self) -> StreamerResult<&[ApplicationNode]> {
        let session = &self.session;
        let os_id = &self.os_id;
        let snapshot = &self.snapshot;
        let ids = self
            .manifest
            .properties
            .sub_applications
            .as_deref()
            .unwrap_or(&[]);

        self.sub_applications.fill_with(|| {
            ids.iter()
                .map(|id| {
                    info!(app_id = %id, "Getting sub-application");
                    Self::fetch(session.clone(), id.clone(), os_id.clone(), snapshot.clone())
                })
                .collect()
        })?;
        Ok(self.sub_applications.items())
    }

    pub fn info(&self) -> ApplicationInfo {
        ApplicationInfo::from_manifest(&self.app_id, &self.os_id, &self.manifest)
    }

    pub fn packages_info(&mut self) -> StreamerResult<Vec<PackageInfo>> {
        Ok(self
            .populate_packages()?
            .iter()
            .map(PackageDescriptor::info)
            .collect())
    }

    pub fn sub_applications_info(&mut self) -> StreamerResult<Vec<ApplicationInfo>> {
        Ok(self
            .populate_sub_applications()?
            .iter()
            .map(ApplicationNode::info)
            .collect())
    }

    /// Version timeline with at most `limit` entries, see [`AvailableVersions`].
    pub fn available_versions(&self, limit: usize) -> AvailableVersions<'_> {
        AvailableVersions::new(self, limit)
    }

    /// Download the payloads of every package into `output_dir`.
    ///
    /// With `recurse`, every sub-application is downloaded into the same
    /// directory after this node.
    pub fn download(&mut self, output_dir: &Path, recurse: bool) -> StreamerResult<DownloadSummary> {
        let mut summary = DownloadSummary::default();
        self.walk(recurse, &mut |node| {
            summary.merge(node.download_own(output_dir)?);
            Ok(())
        })?;
        Ok(summary)
    }

    /// Extract every downloaded payload below `<output_dir>/extracted/`.
    ///
    /// Returns the number of archive entries written.
    pub fn extract(&mut self, output_dir: &Path, recurse: bool) -> StreamerResult<usize> {
        self.extract_with(&TarXzExtractor::new(), output_dir, recurse)
    }

    pub fn extract_with(
        &mut self,
        extractor: &dyn ArchiveExtractor,
        output_dir: &Path,
        recurse: bool,
    ) -> StreamerResult<usize> {
        let mut entries = 0;
        self.walk(recurse, &mut |node| {
            info!(app_id = %node.app_id, "Extracting application");
            for package in node.populate_packages()? {
                entries += package.extract_with(extractor, output_dir)?;
            }
            Ok(())
        })?;
        Ok(entries)
    }

    fn download_own(&mut self, output_dir: &Path) -> StreamerResult<DownloadSummary> {
        info!(app_id = %self.app_id, name = %self.display_name(), "Downloading application");
        let session = self.session.clone();
        let snapshot = self.snapshot.clone();

        let mut jobs: Vec<PayloadJob> = Vec::new();
        for package in self.populate_packages()? {
            if package.has_payloads() {
                jobs.extend(package.payload_jobs(&session, output_dir, snapshot.as_deref()));
            } else {
                info!(source_id = package.source_id(), "No files to download");
            }
        }

        if jobs.is_empty() {
            return Ok(DownloadSummary::default());
        }

        fs::create_dir_all(output_dir).map_err(|e| StreamerError::CreateDirFailed {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        fetch_all(&session, jobs)
    }

    /// Depth-first walk applying `visit` to this node and, with `recurse`,
    /// to every sub-application.
    ///
    /// A sub-application already on the path from the root is skipped.
    pub(crate) fn walk(&mut self, recurse: bool, visit: &mut Visitor<'_>) -> StreamerResult<()> {
        let mut ancestors = Vec::new();
        self.walk_guarded(recurse, &mut ancestors, visit)
    }

    fn walk_guarded(
        &mut self,
        recurse: bool,
        ancestors: &mut Vec<String>,
        visit: &mut Visitor<'_>,
    ) -> StreamerResult<()> {
        visit(self)?;
        if !recurse {
            return Ok(());
        }

        self.populate_sub_applications()?;
        ancestors.push(self.app_id.clone());
        for child in self.sub_applications.items_mut() {
            if ancestors.iter().any(|id| *id == child.app_id) {
                warn!(app_id = %child.app_id, "Sub-application already on the current path, skipping");
                continue;
            }
            child.walk_guarded(recurse, ancestors, visit)?;
        }
        ancestors.pop();
        Ok(())
    }
}
