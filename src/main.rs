//! Car-Harvest main entry point
//!
//! This is the command-line interface for the Car-Harvest listing crawler.

use car_harvest::config::{load_config_with_hash, Config};
use car_harvest::crawler::{run_update, UpdateOptions};
use car_harvest::output::{export_sheet, load_statistics, print_records, print_statistics};
use car_harvest::storage::{open_storage, SqliteStorage, Storage};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Car-Harvest: an incremental listing crawler
///
/// Car-Harvest walks the result pages of a vehicle search, remembers every
/// listing it has seen, and fetches the details of new listings once.
#[derive(Parser, Debug)]
#[command(name = "car-harvest")]
#[command(version = "1.0.0")]
#[command(about = "An incremental listing crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", default_value = "harvest.toml", global = true)]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Discover new listings, then fetch details of pending ones
    Update {
        /// Skip walking the search result pages
        #[arg(long)]
        skip_search: bool,

        /// Skip fetching details of pending listings
        #[arg(long)]
        skip_details: bool,
    },

    /// List completed records
    Ls,

    /// Export completed records as a spreadsheet
    Sheet {
        /// Output file (defaults to the configured sheet path)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show statistics from the database
    Stats,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::debug!("Configuration loaded (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    match cli.command {
        Command::Update {
            skip_search,
            skip_details,
        } => {
            let options = UpdateOptions {
                skip_search,
                skip_details,
            };
            handle_update(config, &config_hash, options).await?
        }
        Command::Ls => handle_ls(&config)?,
        Command::Sheet { output } => handle_sheet(&config, output)?,
        Command::Stats => handle_stats(&config)?,
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("car_harvest=info,warn"),
            1 => EnvFilter::new("car_harvest=debug,info"),
            2 => EnvFilter::new("car_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn open_database(config: &Config) -> Result<SqliteStorage, Box<dyn std::error::Error>> {
    let storage = open_storage(Path::new(&config.output.database_path))?;
    Ok(storage)
}

/// Handles `update`: runs discovery and details against the configured search
async fn handle_update(
    config: Config,
    config_hash: &str,
    options: UpdateOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Search: {}", config.site.search_url);

    match run_update(config, config_hash, options).await {
        Ok(totals) => {
            tracing::info!(
                "Update completed: {} new, {} detailed, {} left pending",
                totals.new_records,
                totals.detailed_records,
                totals.failed_records
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Update failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles `ls`: prints every completed record
fn handle_ls(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let storage = open_database(config)?;
    let records = storage.find_completed()?;
    print_records(&records);
    Ok(())
}

/// Handles `sheet`: exports completed records
fn handle_sheet(config: &Config, output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let path = output.unwrap_or_else(|| PathBuf::from(&config.output.sheet_path));
    let storage = open_database(config)?;

    let written = export_sheet(&storage, &path)?;
    println!("✓ {} records exported to: {}", written, path.display());

    Ok(())
}

/// Handles `stats`: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_database(config)?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}
