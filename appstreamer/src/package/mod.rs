//! Packages of an application and their payload archives.
//!
//! A package manifest lists zero or more payload archives by content hash.
//! The hash names the archive on the distribution service and on disk, and
//! is also the SHA-1 it must hash to:
//!
//! ```text
//! {base}/packages/{hash}.tar.xz  ->  {output_dir}/{hash}.tar.xz
//!                                ->  {output_dir}/extracted/{destination}/...
//! ```

pub mod checksum;
mod descriptor;
mod extractor;
mod payload;

pub use descriptor::{PackageDescriptor, PackageInfo, EXTRACTED_DIR};
pub use extractor::{relative_destination, ArchiveExtractor, TarXzExtractor};
pub use payload::{fetch_all, fetch_payload, DownloadSummary, PayloadJob, PayloadOutcome};
