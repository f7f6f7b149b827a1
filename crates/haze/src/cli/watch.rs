//! The `haze watch` command: scheduled backfill until interrupted.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use haze_core::{BatchError, Config, Haze, Scheduler};

/// Arguments for the `watch` command.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Seconds between batch runs (defaults to scheduler.interval_secs)
    #[arg(long)]
    pub interval: Option<u64>,
}

/// Execute the watch command.
pub async fn execute(config: Config, args: WatchArgs) -> anyhow::Result<()> {
    let interval_secs = args.interval.unwrap_or(config.scheduler.interval_secs);
    let haze = Arc::new(Haze::new(config)?);

    tracing::info!("Backfilling every {interval_secs}s, Ctrl-C to stop");

    let worker = haze.clone();
    let handle = Scheduler::new(Duration::from_secs(interval_secs)).spawn(move || {
        let haze = worker.clone();
        async move {
            // Scheduled-trigger failures go to the operational log only
            match haze.process_batch(None).await {
                Ok(report) if report.processed > 0 => {
                    tracing::info!(
                        "Scheduled batch: {} succeeded, {} skipped, {} failed",
                        report.succeeded,
                        report.skipped,
                        report.failed
                    );
                }
                Ok(_) => tracing::debug!("Scheduled batch: nothing pending"),
                Err(BatchError::AlreadyRunning) => {
                    tracing::debug!("Scheduled batch skipped: a run is already in progress");
                }
                Err(e) => tracing::error!("Scheduled batch failed: {e}"),
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    haze.shutdown();
    handle.stop().await;

    Ok(())
}
