//! Typed view over one package manifest.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::extractor::{relative_destination, ArchiveExtractor, TarXzExtractor};
use super::payload::{fetch_all, DownloadSummary, PayloadJob};
use crate::endpoints::payload_filename;
use crate::error::{StreamerError, StreamerResult};
use crate::manifest::{ManifestClient, PackageManifest, UNKNOWN};
use crate::session::Session;

/// Directory under the output directory that receives extracted payloads.
pub const EXTRACTED_DIR: &str = "extracted";

/// One package of an application, immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    checksum: String,
    manifest: PackageManifest,
}

impl PackageDescriptor {
    pub fn new(checksum: impl Into<String>, manifest: PackageManifest) -> Self {
        Self {
            checksum: checksum.into(),
            manifest,
        }
    }

    /// Fetch the package manifest for `checksum` and wrap it.
    pub fn fetch(
        client: &ManifestClient,
        checksum: &str,
        snapshot_timestamp: Option<&str>,
    ) -> StreamerResult<Self> {
        let manifest = client.fetch_package(checksum, snapshot_timestamp)?;
        Ok(Self::new(checksum, manifest))
    }

    /// Checksum the package was referenced by in its application manifest.
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub fn manifest(&self) -> &PackageManifest {
        &self.manifest
    }

    pub fn source_id(&self) -> &str {
        self.manifest
            .properties
            .source_id
            .as_deref()
            .unwrap_or(UNKNOWN)
    }

    pub fn size_bytes(&self) -> Option<u64> {
        self.manifest.properties.size
    }

    pub fn destination(&self) -> &str {
        self.manifest
            .properties
            .destination
            .as_deref()
            .unwrap_or(UNKNOWN)
    }

    pub fn config_source(&self) -> &str {
        self.manifest
            .properties
            .config_source
            .as_deref()
            .unwrap_or(UNKNOWN)
    }

    /// Content hashes of the payload archives, possibly empty.
    pub fn payload_refs(&self) -> &[String] {
        self.manifest.payload_refs.as_deref().unwrap_or(&[])
    }

    pub fn has_payloads(&self) -> bool {
        !self.payload_refs().is_empty()
    }

    pub fn info(&self) -> PackageInfo {
        PackageInfo {
            source_id: self.source_id().to_string(),
            size: self.size_bytes(),
            destination: self.destination().to_string(),
            config_source: self.config_source().to_string(),
        }
    }

    /// Download jobs for every payload, targeting `output_dir`.
    pub fn payload_jobs(
        &self,
        session: &Session,
        output_dir: &Path,
        timestamp: Option<&str>,
    ) -> Vec<PayloadJob> {
        self.payload_refs()
            .iter()
            .map(|hash| PayloadJob::new(session, hash, output_dir, timestamp))
            .collect()
    }

    /// Download every payload of this package into `output_dir`.
    ///
    /// Files already present with a matching hash are left alone. A package
    /// without payloads is satisfied without touching the filesystem.
    pub fn download(
        &self,
        session: &Session,
        output_dir: &Path,
        timestamp: Option<&str>,
    ) -> StreamerResult<DownloadSummary> {
        if !self.has_payloads() {
            info!(source_id = self.source_id(), "No files to download");
            return Ok(DownloadSummary::default());
        }

        ensure_dir(output_dir)?;
        fetch_all(session, self.payload_jobs(session, output_dir, timestamp))
    }

    /// `<output_dir>/extracted/<destination>`.
    pub fn extraction_dir(&self, output_dir: &Path) -> PathBuf {
        output_dir
            .join(EXTRACTED_DIR)
            .join(relative_destination(self.destination()))
    }

    /// Unpack every downloaded payload into [`extraction_dir`](Self::extraction_dir).
    ///
    /// Returns the number of archive entries written.
    pub fn extract(&self, output_dir: &Path) -> StreamerResult<usize> {
        self.extract_with(&TarXzExtractor::new(), output_dir)
    }

    pub fn extract_with(
        &self,
        extractor: &dyn ArchiveExtractor,
        output_dir: &Path,
    ) -> StreamerResult<usize> {
        if !self.has_payloads() {
            info!(source_id = self.source_id(), "No files to extract");
            return Ok(0);
        }

        let dest = self.extraction_dir(output_dir);
        let mut entries = 0;
        for hash in self.payload_refs() {
            let filename = payload_filename(hash);
            info!(file = %filename, destination = %dest.display(), "Extracting package");
            entries += extractor.extract(&output_dir.join(&filename), &dest)?;
        }
        Ok(entries)
    }

    /// Ask the archive to capture every payload archive of this package.
    pub fn store_to_archive(&self, session: &Session) -> StreamerResult<()> {
        if !self.has_payloads() {
            info!(source_id = self.source_id(), "No files to store");
            return Ok(());
        }

        for hash in self.payload_refs() {
            info!(file = %payload_filename(hash), "Storing package to archive");
            session.submit_to_archive(&session.endpoints().payload_url(hash))?;
        }
        Ok(())
    }
}

/// Read-only projection of a package's properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub source_id: String,
    pub size: Option<u64>,
    pub destination: String,
    pub config_source: String,
}

impl fmt::Display for PackageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Package: {}", self.source_id)?;
        match self.size {
            Some(size) => writeln!(f, "\tSize: {} bytes", size)?,
            None => writeln!(f, "\tSize: {}", UNKNOWN)?,
        }
        writeln!(f, "\tDestination: {}", self.destination)?;
        write!(f, "\tConfig source: {}", self.config_source)
    }
}

fn ensure_dir(path: &Path) -> StreamerResult<()> {
    fs::create_dir_all(path).map_err(|e| StreamerError::CreateDirFailed {
        path: path.to_path_buf(),
        source: e,
    })
}
