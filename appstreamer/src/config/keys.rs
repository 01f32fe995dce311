//! Addressable configuration keys (`section.key`).

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::file::ConfigFile;
use crate::error::{StreamerError, StreamerResult};
use crate::platform::Platform;

/// One setting of the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    StreamerBaseUrl,
    StreamerAppId,
    StreamerPlatform,
    StreamerOutputDir,
    ArchiveBaseUrl,
    ArchiveSearchLimit,
    DownloadVerifyChecksums,
    DownloadParallelDownloads,
    DownloadTimeoutSecs,
}

impl ConfigKey {
    /// Every key, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            Self::StreamerBaseUrl,
            Self::StreamerAppId,
            Self::StreamerPlatform,
            Self::StreamerOutputDir,
            Self::ArchiveBaseUrl,
            Self::ArchiveSearchLimit,
            Self::DownloadVerifyChecksums,
            Self::DownloadParallelDownloads,
            Self::DownloadTimeoutSecs,
        ]
    }

    pub fn section(&self) -> &'static str {
        match self {
            Self::StreamerBaseUrl
            | Self::StreamerAppId
            | Self::StreamerPlatform
            | Self::StreamerOutputDir => "streamer",
            Self::ArchiveBaseUrl | Self::ArchiveSearchLimit => "archive",
            Self::DownloadVerifyChecksums
            | Self::DownloadParallelDownloads
            | Self::DownloadTimeoutSecs => "download",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            Self::StreamerBaseUrl | Self::ArchiveBaseUrl => "base_url",
            Self::StreamerAppId => "app_id",
            Self::StreamerPlatform => "platform",
            Self::StreamerOutputDir => "output_dir",
            Self::ArchiveSearchLimit => "search_limit",
            Self::DownloadVerifyChecksums => "verify_checksums",
            Self::DownloadParallelDownloads => "parallel_downloads",
            Self::DownloadTimeoutSecs => "timeout_secs",
        }
    }

    /// `section.key`.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as text, empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        fn opt<T: ToString>(value: &Option<T>) -> String {
            value.as_ref().map(ToString::to_string).unwrap_or_default()
        }

        match self {
            Self::StreamerBaseUrl => opt(&config.streamer.base_url),
            Self::StreamerAppId => opt(&config.streamer.app_id),
            Self::StreamerPlatform => opt(&config.streamer.platform),
            Self::StreamerOutputDir => config
                .streamer
                .output_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            Self::ArchiveBaseUrl => opt(&config.archive.base_url),
            Self::ArchiveSearchLimit => opt(&config.archive.search_limit),
            Self::DownloadVerifyChecksums => config.download.verify_checksums.to_string(),
            Self::DownloadParallelDownloads => config.download.parallel_downloads.to_string(),
            Self::DownloadTimeoutSecs => config.download.timeout_secs.to_string(),
        }
    }

    /// Validate and store `value`. An empty value clears an optional key.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> StreamerResult<()> {
        let value = value.trim();
        let optional = |v: &str| (!v.is_empty()).then(|| v.to_string());

        match self {
            Self::StreamerBaseUrl => config.streamer.base_url = optional(value),
            Self::StreamerAppId => config.streamer.app_id = optional(value),
            Self::StreamerPlatform => {
                config.streamer.platform = match value {
                    "" => None,
                    token => Some(token.parse::<Platform>()?),
                }
            }
            Self::StreamerOutputDir => config.streamer.output_dir = optional(value).map(PathBuf::from),
            Self::ArchiveBaseUrl => config.archive.base_url = optional(value),
            Self::ArchiveSearchLimit => {
                config.archive.search_limit = match value {
                    "" => None,
                    v => Some(self.parse_positive(v)?),
                }
            }
            Self::DownloadVerifyChecksums => {
                config.download.verify_checksums = self.parse_bool(value)?
            }
            Self::DownloadParallelDownloads => {
                config.download.parallel_downloads = self.parse_positive(value)?
            }
            Self::DownloadTimeoutSecs => {
                config.download.timeout_secs = self.parse_positive(value)? as u64
            }
        }
        Ok(())
    }

    fn parse_bool(&self, value: &str) -> StreamerResult<bool> {
        match value.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Ok(true),
            "false" | "no" | "0" | "off" => Ok(false),
            _ => Err(self.invalid(value, "expected true or false")),
        }
    }

    fn parse_positive(&self, value: &str) -> StreamerResult<usize> {
        match value.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(self.invalid(value, "expected a positive integer")),
        }
    }

    fn invalid(&self, value: &str, expected: &str) -> StreamerError {
        StreamerError::Config(format!(
            "invalid value '{}' for {}: {}",
            value,
            self.name(),
            expected
        ))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

impl FromStr for ConfigKey {
    type Err = StreamerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| StreamerError::Config(format!("unknown configuration key '{}'", s)))
    }
}
