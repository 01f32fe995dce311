//! Archive extraction for payload files.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};

use tar::Archive;
use tracing::warn;
use xz2::read::XzDecoder;

use crate::error::{StreamerError, StreamerResult};

/// Unpacks an archive into a directory.
pub trait ArchiveExtractor: Send + Sync {
    /// Extract `archive_path` into `dest_dir`, creating it if needed.
    ///
    /// Returns the number of entries written.
    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> StreamerResult<usize>;
}

/// In-process `.tar.xz` extractor.
#[derive(Debug, Default, Clone, Copy)]
pub struct TarXzExtractor;

impl TarXzExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ArchiveExtractor for TarXzExtractor {
    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> StreamerResult<usize> {
        fs::create_dir_all(dest_dir).map_err(|e| StreamerError::CreateDirFailed {
            path: dest_dir.to_path_buf(),
            source: e,
        })?;

        let file = File::open(archive_path).map_err(|e| StreamerError::ReadFailed {
            path: archive_path.to_path_buf(),
            source: e,
        })?;

        let failed = |reason: String| StreamerError::ExtractionFailed {
            path: archive_path.to_path_buf(),
            reason,
        };

        let mut archive = Archive::new(XzDecoder::new(BufReader::new(file)));
        let mut count = 0;

        for entry in archive.entries().map_err(|e| failed(e.to_string()))? {
            let mut entry = entry.map_err(|e| failed(e.to_string()))?;
            // unpack_in refuses entries that would land outside dest_dir
            if entry.unpack_in(dest_dir).map_err(|e| failed(e.to_string()))? {
                count += 1;
            } else {
                let name = entry
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                warn!(entry = %name, archive = %archive_path.display(), "Skipping entry outside destination");
            }
        }

        Ok(count)
    }
}

/// Reduce a manifest-declared destination to a relative path.
///
/// Root, prefix, `.` and `..` components are dropped and both `/` and `\`
/// separate components.
pub fn relative_destination(destination: &str) -> PathBuf {
    let normalized = destination.replace('\\', "/");
    Path::new(&normalized)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}
