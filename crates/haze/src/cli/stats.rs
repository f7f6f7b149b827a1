//! The `haze stats` command: live hash coverage counts.

use haze_core::{Config, Haze};

/// Execute the stats command.
pub async fn execute(config: Config) -> anyhow::Result<()> {
    let haze = Haze::new(config)?;
    let stats = haze.compute_stats().await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
