//! The `haze run` command: one manually triggered backfill batch.
//!
//! On success prints `{"completed": .., "pending": ..}` to stdout so callers
//! (scripts, admin panels) get updated coverage in one round trip; failures
//! come back as a structured error payload and a non-zero exit.

use clap::Args;
use haze_core::{Config, Haze};
use serde::Serialize;

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Max pending assets to process (defaults to processing.batch_limit)
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Coverage counts returned to the manual trigger after a batch.
#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub completed: u64,
    pub pending: u64,
}

/// Structured failure payload for the manual trigger.
#[derive(Debug, Serialize)]
struct RunFailure {
    error: String,
}

/// Execute the run command.
pub async fn execute(config: Config, args: RunArgs) -> anyhow::Result<()> {
    let haze = Haze::new(config)?;

    let spinner = create_spinner();
    let batch = haze.process_batch(args.limit).await;
    spinner.finish_and_clear();

    match batch {
        Ok(report) => {
            tracing::info!(
                "Batch processed {} asset(s): {} succeeded, {} skipped, {} failed",
                report.processed,
                report.succeeded,
                report.skipped,
                report.failed
            );
            let stats = haze.compute_stats().await?;
            let response = RunResponse {
                completed: stats.with_hash,
                pending: stats.without_hash,
            };
            println!("{}", serde_json::to_string(&response)?);
            Ok(())
        }
        Err(e) => {
            println!(
                "{}",
                serde_json::to_string(&RunFailure {
                    error: e.to_string()
                })?
            );
            Err(anyhow::Error::new(e))
        }
    }
}

fn create_spinner() -> indicatif::ProgressBar {
    let spinner = indicatif::ProgressBar::new_spinner();
    spinner.set_message("processing pending assets...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));
    spinner
}
