//! AppStreamer - mirror and archive application-streaming manifest trees
//!
//! Resolves a vendor's manifest tree for an application and platform,
//! downloads and verifies its package payloads, extracts them, and
//! submits the tree to a public web archive.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use appstreamer::{ApplicationNode, Platform, Session, DEFAULT_APP_ID};
//!
//! # fn main() -> appstreamer::StreamerResult<()> {
//! let session = Session::with_defaults()?;
//! let mut app = ApplicationNode::new(session, DEFAULT_APP_ID, Platform::Windows.os_id())?;
//! println!("{}", app.info());
//!
//! app.download(Path::new("data"), true)?;
//! app.extract(Path::new("data"), true)?;
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod archive;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod manifest;
pub mod package;
pub mod platform;
pub mod session;

pub use application::{ApplicationInfo, ApplicationNode, AvailableVersions, VersionEntry};
pub use archive::{ArchiveSynchronizer, SnapshotIndex, SyncReport};
pub use endpoints::Endpoints;
pub use error::{StreamerError, StreamerResult};
pub use http::{HttpClient, ReqwestClient};
pub use package::{PackageDescriptor, PackageInfo};
pub use platform::{Platform, DEFAULT_APP_ID};
pub use session::{DownloadSettings, Session};
