//! Archive service integration.
//!
//! Captures of a URL are listed through the search index
//! ([`SnapshotIndex`]) and fetched back through retrieval URLs. The
//! [`ArchiveSynchronizer`] submits a whole application tree for capture
//! when its version moved on.

mod snapshot;
mod sync;

pub use snapshot::{parse_timestamp, Snapshot, SnapshotIndex, Snapshots, TIMESTAMP_FORMAT};
pub use sync::{ArchiveSynchronizer, SyncReport};
