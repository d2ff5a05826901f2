//! ReleaseWatch CLI - Command-line interface
//!
//! Checks the published installers for each platform, downloads new
//! releases and keeps the version history.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use commands::common::PlatformArg;
use commands::config::ConfigCommands;
use commands::crawl::CrawlArgs;
use commands::fetch::FetchArgs;
use commands::history::HistoryArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "releasewatch")]
#[command(version, about = "Track desktop installer releases and download new ones", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the per-user config.ini)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check every platform for a new release and download it (default)
    Crawl {
        /// Only check one platform
        #[arg(long, value_enum)]
        platform: Option<PlatformArg>,
    },

    /// Download a single URL with the parallel downloader
    Fetch {
        /// Source URL
        url: String,

        /// Destination file
        dest: PathBuf,

        /// Number of concurrent range requests
        #[arg(long)]
        workers: Option<usize>,

        /// Range size in bytes
        #[arg(long, value_name = "BYTES")]
        chunk_size: Option<u64>,

        /// Expected SHA-256 of the downloaded file
        #[arg(long, value_name = "HEX")]
        sha256: Option<String>,

        /// Use one sequential stream instead of ranges
        #[arg(long)]
        single: bool,
    },

    /// Show recorded releases
    History {
        /// Only show one platform
        #[arg(long, value_enum)]
        platform: Option<PlatformArg>,
    },

    /// Print the SHA-256 of a file
    Hash {
        /// File to hash
        file: PathBuf,
    },

    /// View or change configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Write a configuration file with default settings
    Init,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.as_deref();

    match cli.command.unwrap_or(Commands::Crawl { platform: None }) {
        Commands::Crawl { platform } => commands::crawl::run(CrawlArgs {
            config_path,
            platform,
        }),
        Commands::Fetch {
            url,
            dest,
            workers,
            chunk_size,
            sha256,
            single,
        } => commands::fetch::run(FetchArgs {
            config_path,
            url,
            dest,
            workers,
            chunk_size,
            sha256,
            single,
        }),
        Commands::History { platform } => commands::history::run(HistoryArgs {
            config_path,
            platform,
        }),
        Commands::Hash { file } => commands::hash::run(&file),
        Commands::Config { command } => commands::config::run(config_path, command),
        Commands::Init => commands::init::run(config_path),
    }
}
