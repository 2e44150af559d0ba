//! SongCapture CLI - Command-line interface
//!
//! This binary pages through remote playlists and resolves their artwork
//! using the SongCapture library.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::artwork::ArtworkArgs;
use commands::common::ServiceArg;
use commands::config::ConfigCommands;
use commands::playlists::PlaylistsArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "songcapture")]
#[command(about = "Page through remote playlists and resolve their artwork", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scroll through a service's playlists, loading pages on demand
    Playlists {
        /// Music service to browse
        #[arg(long, value_enum, default_value = "apple-music")]
        service: ServiceArg,

        /// Stop after displaying this many rows
        #[arg(long)]
        limit: Option<usize>,

        /// Playlists requested per page (overrides config)
        #[arg(long)]
        page_size: Option<usize>,

        /// Rows from the end at which the next page loads (overrides config)
        #[arg(long)]
        threshold: Option<usize>,

        /// Row index to select and save to the library (repeatable)
        #[arg(long = "select", value_name = "ROW")]
        select: Vec<usize>,
    },

    /// Resolve artwork locators (https://, file://, musickit://)
    Artwork {
        /// Locators to resolve
        #[arg(required = true)]
        locators: Vec<String>,

        /// Concurrent callers per locator
        #[arg(long, default_value_t = 4)]
        callers: usize,
    },

    /// View and modify configuration settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Playlists {
            service,
            limit,
            page_size,
            threshold,
            select,
        } => commands::playlists::run(
            PlaylistsArgs {
                service,
                limit,
                page_size,
                threshold,
                select,
            },
            cli.verbose,
        ),
        Commands::Artwork { locators, callers } => {
            commands::artwork::run(ArtworkArgs { locators, callers }, cli.verbose)
        }
        Commands::Config(command) => commands::config::run(command),
    }
}
