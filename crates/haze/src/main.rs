//! haze CLI - blurhash placeholder generator and backfill runner.
//!
//! haze keeps a media library's placeholder hashes complete: new assets are
//! hashed on demand, older ones are backfilled in bounded batches.
//!
//! # Usage
//!
//! ```bash
//! # Hash one asset (the upload-hook path)
//! haze single photos/2024/beach.jpg
//!
//! # Run one backfill batch and print {completed, pending}
//! haze run --limit 50
//!
//! # Keep backfilling on the configured cadence
//! haze watch
//!
//! # Coverage counts
//! haze stats
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// haze - blurhash placeholder generator and backfill runner.
#[derive(Parser, Debug)]
#[command(name = "haze")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Hash a single asset immediately
    Single(cli::single::SingleArgs),

    /// Run one backfill batch over pending assets
    Run(cli::run::RunArgs),

    /// Run backfill batches on the configured schedule until interrupted
    Watch(cli::watch::WatchArgs),

    /// Show completed/pending hash coverage
    Stats,

    /// View configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go to stderr directly.
    let config = match haze_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `haze config path`."
            );
            haze_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("haze v{}", haze_core::VERSION);

    match cli.command {
        Commands::Single(args) => cli::single::execute(config, args).await,
        Commands::Run(args) => cli::run::execute(config, args).await,
        Commands::Watch(args) => cli::watch::execute(config, args).await,
        Commands::Stats => cli::stats::execute(config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
