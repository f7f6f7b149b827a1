//! The `haze single` command: hash one asset immediately.
//!
//! This is the same path an upload hook would call.

use clap::Args;
use haze_core::{Config, Haze, ProcessOutcome, SkipReason};

/// Arguments for the `single` command.
#[derive(Args, Debug)]
pub struct SingleArgs {
    /// Asset id (path relative to the media root)
    pub asset_id: String,
}

/// Execute the single command.
pub async fn execute(config: Config, args: SingleArgs) -> anyhow::Result<()> {
    let haze = Haze::new(config)?;

    match haze.process_single(&args.asset_id).await {
        ProcessOutcome::Success { hash } => {
            println!("{hash}");
            Ok(())
        }
        ProcessOutcome::Skipped(SkipReason::ResourceNotFound) => {
            tracing::warn!("No image file behind asset {}", args.asset_id);
            Ok(())
        }
        ProcessOutcome::Skipped(SkipReason::AlreadyInFlight) => {
            tracing::info!("Asset {} is already being processed", args.asset_id);
            Ok(())
        }
        ProcessOutcome::Failed(e) => Err(anyhow::Error::new(e)),
    }
}
