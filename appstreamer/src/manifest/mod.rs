//! Application and package manifests.
//!
//! The distribution service publishes one root manifest per
//! `(os_id, app_id)` pair and one manifest per package:
//!
//! ```text
//! {base}/{os_id}/{app_id}/full.json      -> Manifest
//! {base}/packages/{checksum}.json        -> PackageManifest
//! ```

mod client;
mod types;

pub use client::ManifestClient;
pub use types::{
    Manifest, ManifestProperties, PackageManifest, PackageProperties, PackageRef, RequiredOs,
    UNKNOWN,
};
