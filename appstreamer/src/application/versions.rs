//! Build version history of an application.

use chrono::{DateTime, Utc};

use super::node::ApplicationNode;
use crate::archive::{SnapshotIndex, Snapshots};
use crate::error::StreamerResult;
use crate::manifest::ManifestClient;

/// One point of an application's version timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    pub timestamp: DateTime<Utc>,
    pub build_version: String,
    /// Raw archive timestamp, `None` for the live manifest.
    pub snapshot: Option<String>,
}

impl VersionEntry {
    pub fn is_live(&self) -> bool {
        self.snapshot.is_none()
    }
}

enum History {
    Pending(i64),
    Running(Snapshots),
    Done,
}

/// Lazy timeline of `(timestamp, build_version)` pairs, oldest first.
///
/// Archived captures come first, each re-fetched to read its build version.
/// The live version closes the timeline unless it equals the last archived
/// one. The index is only queried on the first call to `next`, and the
/// iterator stops after the first error.
pub struct AvailableVersions<'a> {
    node: &'a ApplicationNode,
    manifests: ManifestClient,
    index: SnapshotIndex,
    history: History,
    last_version: Option<String>,
    live_done: bool,
}

impl<'a> AvailableVersions<'a> {
    pub(crate) fn new(node: &'a ApplicationNode, limit: usize) -> Self {
        let history = if limit > 1 {
            History::Pending(i64::try_from(limit - 1).unwrap_or(i64::MAX))
        } else {
            History::Done
        };

        Self {
            node,
            manifests: ManifestClient::new(node.session().clone()),
            index: SnapshotIndex::new(node.session().clone()),
            history,
            last_version: None,
            live_done: false,
        }
    }

    fn next_archived(&mut self) -> Option<StreamerResult<VersionEntry>> {
        loop {
            match &mut self.history {
                History::Pending(limit) => {
                    let limit = *limit;
                    match self.index.list_snapshots(&self.node.manifest_url(), limit) {
                        Ok(snapshots) => self.history = History::Running(snapshots),
                        Err(e) => return Some(Err(e)),
                    }
                }
                History::Running(snapshots) => {
                    let snapshot = match snapshots.next() {
                        Some(Ok(snapshot)) => snapshot,
                        Some(Err(e)) => return Some(Err(e)),
                        None => {
                            self.history = History::Done;
                            continue;
                        }
                    };

                    let manifest = match self.manifests.fetch(
                        self.node.app_id(),
                        self.node.os_id(),
                        Some(snapshot.raw_timestamp()),
                    ) {
                        Ok(manifest) => manifest,
                        Err(e) => return Some(Err(e)),
                    };

                    self.last_version = Some(manifest.build_version.clone());
                    return Some(Ok(VersionEntry {
                        timestamp: snapshot.timestamp(),
                        build_version: manifest.build_version,
                        snapshot: Some(snapshot.raw_timestamp().to_string()),
                    }));
                }
                History::Done => return None,
            }
        }
    }

    fn live_version(&self) -> StreamerResult<String> {
        if self.node.snapshot_timestamp().is_none() {
            return Ok(self.node.build_version().to_string());
        }
        let live = self
            .manifests
            .fetch(self.node.app_id(), self.node.os_id(), None)?;
        Ok(live.build_version)
    }
}

impl Iterator for AvailableVersions<'_> {
    type Item = StreamerResult<VersionEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(item) = self.next_archived() {
            if item.is_err() {
                self.history = History::Done;
                self.live_done = true;
            }
            return Some(item);
        }

        if self.live_done {
            return None;
        }
        self.live_done = true;

        match self.live_version() {
            Ok(current) if self.last_version.as_deref() == Some(current.as_str()) => None,
            Ok(current) => Some(Ok(VersionEntry {
                timestamp: Utc::now(),
                build_version: current,
                snapshot: None,
            })),
            Err(e) => Some(Err(e)),
        }
    }
}
