//! Pushing an application tree into the archive.

use tracing::info;

use super::snapshot::SnapshotIndex;
use crate::application::ApplicationNode;
use crate::error::StreamerResult;
use crate::manifest::ManifestClient;
use crate::session::Session;

/// Outcome of one synchronization pass, by app id in visit order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Nodes whose manifest, package manifests and payloads were submitted.
    pub stored: Vec<String>,
    /// Nodes whose current version was already the latest capture.
    pub already_archived: Vec<String>,
}

/// Archives every node of a tree whose version changed since the last capture.
///
/// Only the application manifest's version is compared. When it is
/// unchanged the packages are assumed to be archived too.
#[derive(Debug, Clone)]
pub struct ArchiveSynchronizer {
    session: Session,
    index: SnapshotIndex,
    manifests: ManifestClient,
}

impl ArchiveSynchronizer {
    pub fn new(session: Session) -> Self {
        Self {
            index: SnapshotIndex::new(session.clone()),
            manifests: ManifestClient::new(session.clone()),
            session,
        }
    }

    /// Synchronize `node` and then, depth first, every sub-application.
    ///
    /// `node` is expected to be live: its manifest is the current version.
    pub fn synchronize(&self, node: &mut ApplicationNode) -> StreamerResult<SyncReport> {
        let mut report = SyncReport::default();
        node.walk(true, &mut |n| {
            if self.synchronize_node(n)? {
                report.stored.push(n.app_id().to_string());
            } else {
                report.already_archived.push(n.app_id().to_string());
            }
            Ok(())
        })?;
        Ok(report)
    }

    /// `(archived, current)` versions of `node`.
    ///
    /// The timeline is the build versions of the two most recent captures,
    /// followed by the live version when it differs from the last capture.
    /// `current` is its last entry and `archived` the one before it, absent
    /// when the timeline has a single entry.
    pub fn recent_versions(&self, node: &ApplicationNode) -> StreamerResult<(Option<String>, String)> {
        let mut timeline = Vec::new();
        for snapshot in self.index.latest(&node.manifest_url(), 2)? {
            let snapshot = snapshot?;
            let manifest =
                self.manifests
                    .fetch(node.app_id(), node.os_id(), Some(snapshot.raw_timestamp()))?;
            timeline.push(manifest.build_version);
        }

        let current = node.build_version().to_string();
        if timeline.last() == Some(&current) {
            timeline.pop();
        }
        Ok((timeline.pop(), current))
    }

    /// Archive one node if required. Returns whether anything was submitted.
    fn synchronize_node(&self, node: &mut ApplicationNode) -> StreamerResult<bool> {
        let (archived, current) = self.recent_versions(node)?;

        if archived.as_deref() == Some(current.as_str()) {
            info!(
                version = %current,
                name = node.display_name(),
                "Version already in archive, assuming packages are there too"
            );
            return Ok(false);
        }

        info!(version = %current, name = node.display_name(), "Storing version to archive");
        self.session.submit_to_archive(&node.manifest_url())?;

        for package in node.populate_packages_archiving()? {
            info!(source_id = package.source_id(), "Storing package to archive");
            package.store_to_archive(&self.session)?;
        }
        Ok(true)
    }
}
