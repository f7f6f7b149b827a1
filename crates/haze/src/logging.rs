//! Logging initialization.
//!
//! Uses the `tracing` ecosystem. Output goes to stderr; stdout is reserved
//! for the structured JSON responses the run/stats commands print.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem.
///
/// The `RUST_LOG` environment variable overrides the level when set.
pub fn init(verbose: bool, json_format: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from config, with CLI flag overrides.
pub fn init_from_config(config: &haze_core::Config, verbose: bool, json_logs: bool) {
    let verbose =
        verbose || config.logging.level == "debug" || config.logging.level == "trace";
    let json_format = json_logs || config.logging.format == "json";
    init(verbose, json_format);
}
