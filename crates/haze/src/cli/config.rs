//! The `haze config` command for configuration introspection.

use clap::{Args, Subcommand};
use haze_core::Config;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration introspection.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration as TOML
    Show,

    /// Show the config file path
    Path,
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = Config::load()?;
            println!("{}", config.to_toml()?);
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_path().display());
        }
    }
    Ok(())
}
