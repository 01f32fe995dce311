//! Top-level streamer actions: info, history, download, extract and archive.

use std::env;
use std::path::PathBuf;

use appstreamer::config::ConfigFile;
use appstreamer::manifest::UNKNOWN;
use appstreamer::{
    ApplicationNode, ArchiveSynchronizer, PackageInfo, Platform, Session, DEFAULT_APP_ID,
};
use clap::Args;
use tracing::info;

use super::common::{format_size, format_version};
use crate::error::CliError;

/// Environment variable that enables `--store-to-archive` when non-empty.
pub const STORE_TO_ARCHIVE_ENV: &str = "STORE_TO_ARCHIVE";

const DEFAULT_OUTPUT_DIR: &str = "data";

#[derive(Debug, Clone, Default, Args)]
pub struct StreamerArgs {
    /// Print the application info
    #[arg(short, long)]
    pub info: bool,

    /// Print the packages info
    #[arg(long)]
    pub packages_info: bool,

    /// Print the sub-applications info
    #[arg(long)]
    pub sub_applications_info: bool,

    /// The application id
    #[arg(long, value_name = "ID")]
    pub app_id: Option<String>,

    /// The platform: windows, win, osx or mac
    #[arg(short, long, value_name = "PLATFORM")]
    pub platform: Option<String>,

    /// Recurse into sub-applications
    #[arg(short, long)]
    pub recurse: bool,

    /// The output directory
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Download the packages to <output-dir>
    #[arg(short, long)]
    pub download: bool,

    /// Extract the packages after download to <output-dir>/extracted
    #[arg(short, long)]
    pub extract: bool,

    /// List the available versions, with an optional snapshot count
    #[arg(
        long,
        value_name = "N",
        num_args = 0..=1,
        default_missing_value = "20"
    )]
    pub versions: Option<usize>,

    /// Use this build version instead of the latest
    #[arg(long, value_name = "VERSION")]
    pub build: Option<String>,

    /// Store the whole version tree to the archive if required
    #[arg(long)]
    pub store_to_archive: bool,
}

/// What a command line asks for, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    StoreToArchive,
    Info,
    Versions(usize),
    PackagesInfo,
    SubApplicationsInfo,
    Materialize { extract: bool },
    Nothing,
}

impl StreamerArgs {
    /// Resolve the action, honouring the `STORE_TO_ARCHIVE` environment variable.
    pub fn action(&self) -> Action {
        let from_env = env::var_os(STORE_TO_ARCHIVE_ENV).is_some_and(|v| !v.is_empty());
        self.action_for(from_env)
    }

    pub fn action_for(&self, store_from_env: bool) -> Action {
        if self.store_to_archive || store_from_env {
            Action::StoreToArchive
        } else if self.info {
            Action::Info
        } else if let Some(count) = self.versions {
            Action::Versions(count)
        } else if self.packages_info {
            Action::PackagesInfo
        } else if self.sub_applications_info {
            Action::SubApplicationsInfo
        } else if self.download || self.extract {
            Action::Materialize {
                extract: self.extract,
            }
        } else {
            Action::Nothing
        }
    }
}

/// Flag, then config file, then the default platform.
pub fn resolve_platform(flag: Option<&str>, config: &ConfigFile) -> Result<Platform, CliError> {
    match flag {
        Some(token) => Ok(token.parse::<Platform>()?),
        None => Ok(config.streamer.platform.unwrap_or_default()),
    }
}

pub fn run(args: StreamerArgs) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let platform = resolve_platform(args.platform.as_deref(), &config)?;

    let action = args.action();
    if action == Action::Nothing {
        println!("Nothing to do. Run with --help to see the available actions.");
        return Ok(());
    }

    let app_id = args
        .app_id
        .clone()
        .or_else(|| config.streamer.app_id.clone())
        .unwrap_or_else(|| DEFAULT_APP_ID.to_string());
    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| config.streamer.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    let session = config.to_session()?;

    info!(app_id = %app_id, platform = %platform, "Resolving application");

    if action == Action::StoreToArchive {
        let mut app = ApplicationNode::new(session.clone(), app_id, platform.os_id())?;
        return store_to_archive(session, &mut app);
    }

    let mut app = match &args.build {
        Some(version) => ApplicationNode::at_build_version(
            session,
            &app_id,
            platform.os_id(),
            version,
            config.search_limit(),
        )?,
        None => ApplicationNode::new(session, app_id, platform.os_id())?,
    };

    match action {
        Action::Info => println!("{}", app.info()),
        Action::Versions(count) => {
            for entry in app.available_versions(count) {
                println!("{}", format_version(&entry?));
            }
        }
        Action::PackagesInfo => {
            for package in app.packages_info()? {
                println!("{}", format_package(&package));
            }
        }
        Action::SubApplicationsInfo => {
            for sub in app.sub_applications_info()? {
                println!("{}", sub);
            }
        }
        Action::Materialize { extract } => {
            let summary = app.download(&output_dir, args.recurse)?;
            println!(
                "Downloaded {} file(s) ({}), {} already present",
                summary.downloaded,
                format_size(summary.bytes),
                summary.skipped
            );

            if extract {
                let entries = app.extract(&output_dir, args.recurse)?;
                println!(
                    "Extracted {} entries to {}",
                    entries,
                    output_dir.join("extracted").display()
                );
            }
        }
        Action::StoreToArchive | Action::Nothing => {}
    }

    Ok(())
}

fn store_to_archive(session: Session, app: &mut ApplicationNode) -> Result<(), CliError> {
    println!("Storing whole version to archive if required");
    let report = ArchiveSynchronizer::new(session).synchronize(app)?;
    println!(
        "Stored {} application(s), {} already archived",
        report.stored.len(),
        report.already_archived.len()
    );
    Ok(())
}

fn format_package(package: &PackageInfo) -> String {
    let size = package
        .size
        .map(format_size)
        .unwrap_or_else(|| UNKNOWN.to_string());
    format!(
        "Package: {}\n\tSize: {}\n\tDestination: {}\n\tConfig source: {}",
        package.source_id, size, package.destination, package.config_source
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_precedence() {
        let mut args = StreamerArgs {
            info: true,
            packages_info: true,
            download: true,
            versions: Some(3),
            ..Default::default()
        };
        assert_eq!(args.action_for(true), Action::StoreToArchive);
        assert_eq!(args.action_for(false), Action::Info);

        args.info = false;
        assert_eq!(args.action_for(false), Action::Versions(3));

        args.versions = None;
        assert_eq!(args.action_for(false), Action::PackagesInfo);

        args.packages_info = false;
        assert_eq!(
            args.action_for(false),
            Action::Materialize { extract: false }
        );
    }

    #[test]
    fn test_extract_implies_download() {
        let args = StreamerArgs {
            extract: true,
            ..Default::default()
        };
        assert_eq!(args.action_for(false), Action::Materialize { extract: true });
        assert_eq!(StreamerArgs::default().action_for(false), Action::Nothing);
    }

    #[test]
    fn test_resolve_platform() {
        let mut config = ConfigFile::default();
        assert_eq!(resolve_platform(None, &config).unwrap(), Platform::Windows);

        config.streamer.platform = Some(Platform::Osx);
        assert_eq!(resolve_platform(None, &config).unwrap(), Platform::Osx);
        assert_eq!(resolve_platform(Some("win"), &config).unwrap(), Platform::Windows);

        assert!(matches!(
            resolve_platform(Some("linux"), &config),
            Err(CliError::Usage(_))
        ));
    }

    #[test]
    fn test_format_package_uses_human_sizes() {
        let package = PackageInfo {
            source_id: "core".into(),
            size: Some(2048),
            destination: "bin".into(),
            config_source: "Unknown".into(),
        };
        assert_eq!(
            format_package(&package),
            "Package: core\n\tSize: 2.0 KB\n\tDestination: bin\n\tConfig source: Unknown"
        );
    }
}
