//! bgg-tiers CLI
//!
//! Exports an owned BoardGameGeek collection, with thumbnails, for the tier
//! list frontend.

mod commands;
mod error;

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::LevelFilter;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use crate::error::CliError;

#[derive(Parser)]
#[command(name = "bgg-tiers", version)]
#[command(
    about = "Export an owned BoardGameGeek collection for the tier list frontend",
    long_about = None
)]
struct Cli {
    /// Project root containing the frontend/ folder (defaults to current directory)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Only print warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Print debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the collection, download thumbnails, and write games.json (default)
    Fetch,

    /// Inspect BoardGameGeek credentials configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current credentials and their sources
    Show,

    /// Print the config file path
    Path,
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.quiet, cli.verbose);

    if let Err(e) = run(cli) {
        log::error!(
            "{} {}",
            "\u{2718}".if_supports_color(Stderr, |t| t.red()),
            e,
        );
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()
            .map_err(|e| CliError::config(format!("Failed to get current directory: {}", e)))?,
    };

    match cli.command.unwrap_or(Commands::Fetch) {
        Commands::Fetch => commands::fetch::run_fetch(&root, cli.quiet),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(&root),
            ConfigAction::Path => commands::config::run_config_path(),
        },
    }
}

/// Console logger: bare messages, `RUST_LOG` overrides the flag-derived level.
fn init_logger(quiet: bool, verbose: bool) {
    let level = if quiet {
        LevelFilter::Warn
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}
