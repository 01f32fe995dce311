//! User configuration.
//!
//! Settings live in an INI file at `<config dir>/appstreamer/config.ini`:
//!
//! ```text
//! [streamer]
//! base_url = https://dl.appstreaming.autodesk.com/production
//! app_id = 73e72ada57b7480280f7a6f4a289729f
//! platform = windows
//! output_dir = data
//!
//! [archive]
//! base_url = https://web.archive.org
//! search_limit = 20
//!
//! [download]
//! verify_checksums = true
//! parallel_downloads = 1
//! timeout_secs = 300
//! ```
//!
//! Every key is optional. Command-line flags take precedence over the file.

mod file;
mod keys;

pub use file::{
    config_dir, config_file_path, ArchiveSection, ConfigFile, DownloadSection, StreamerSection,
    DEFAULT_SEARCH_LIMIT,
};
pub use keys::ConfigKey;
