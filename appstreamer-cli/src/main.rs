//! AppStreamer CLI - Command-line interface
//!
//! Mirrors an application's manifest tree: prints its info and version
//! history, downloads and extracts its packages, and stores it to the
//! web archive.

mod commands;
mod error;

use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::config::ConfigCommands;
use commands::streamer::StreamerArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "appstreamer")]
#[command(version, about = "Mirror, verify and archive application-streaming manifests")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    streamer: StreamerArgs,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// View and modify configuration settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Some(Commands::Config(command)) => commands::config::run(command),
        None => commands::streamer::run(cli.streamer),
    }
}

fn main() {
    init_logging();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}
