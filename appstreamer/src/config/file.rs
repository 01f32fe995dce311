//! The INI configuration file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use ini::Ini;
use tracing::debug;

use super::keys::ConfigKey;
use crate::endpoints::{Endpoints, DEFAULT_ARCHIVE_BASE, DEFAULT_DISTRIBUTION_BASE};
use crate::error::{StreamerError, StreamerResult};
use crate::http::{ReqwestClient, DEFAULT_TIMEOUT_SECS};
use crate::platform::Platform;
use crate::session::{DownloadSettings, Session};

/// Number of archive captures scanned when none is configured.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Directory holding the configuration file.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("appstreamer")
}

/// `<config_dir>/config.ini`.
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.ini")
}

/// `[streamer]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamerSection {
    pub base_url: Option<String>,
    pub app_id: Option<String>,
    pub platform: Option<Platform>,
    pub output_dir: Option<PathBuf>,
}

/// `[archive]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveSection {
    pub base_url: Option<String>,
    pub search_limit: Option<usize>,
}

/// `[download]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSection {
    pub verify_checksums: bool,
    pub parallel_downloads: usize,
    pub timeout_secs: u64,
}

impl Default for DownloadSection {
    fn default() -> Self {
        let settings = DownloadSettings::default();
        Self {
            verify_checksums: settings.verify_checksums,
            parallel_downloads: settings.parallel_downloads,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub streamer: StreamerSection,
    pub archive: ArchiveSection,
    pub download: DownloadSection,
}

impl ConfigFile {
    /// Load from [`config_file_path`]. A missing file yields the defaults.
    pub fn load() -> StreamerResult<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load the configuration stored at `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to an INI file
    ///
    /// # Returns
    ///
    /// The parsed configuration, or the defaults when `path` does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid INI, or holds
    /// an invalid value for a known key.
    pub fn load_from(path: &Path) -> StreamerResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path).map_err(|e| StreamerError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&text)
    }

    /// Parse INI text. Unknown sections and keys are ignored.
    pub fn parse(text: &str) -> StreamerResult<Self> {
        let ini = Ini::load_from_str(text).map_err(|e| StreamerError::Config(e.to_string()))?;
        let mut config = Self::default();

        for key in ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.key_name()) {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Save to [`config_file_path`], creating its directory.
    pub fn save(&self) -> StreamerResult<()> {
        self.save_to(&config_file_path())
    }

    pub fn save_to(&self, path: &Path) -> StreamerResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StreamerError::CreateDirFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section()))
                    .set(key.key_name(), value);
            }
        }

        ini.write_to_file(path)
            .map_err(|e| StreamerError::WriteFailed {
                path: path.to_path_buf(),
                source: e,
            })
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(
            self.streamer
                .base_url
                .as_deref()
                .unwrap_or(DEFAULT_DISTRIBUTION_BASE),
            self.archive
                .base_url
                .as_deref()
                .unwrap_or(DEFAULT_ARCHIVE_BASE),
        )
    }

    pub fn download_settings(&self) -> DownloadSettings {
        DownloadSettings::default()
            .with_verify_checksums(self.download.verify_checksums)
            .with_parallel_downloads(self.download.parallel_downloads)
    }

    pub fn search_limit(&self) -> usize {
        self.archive.search_limit.unwrap_or(DEFAULT_SEARCH_LIMIT)
    }

    /// A session backed by a [`ReqwestClient`] with the configured timeout.
    pub fn to_session(&self) -> StreamerResult<Session> {
        let client = ReqwestClient::with_timeout(Duration::from_secs(self.download.timeout_secs))?;
        Ok(Session::new(Arc::new(client), self.endpoints()).with_settings(self.download_settings()))
    }
}
