//! Error types for the haze placeholder pipeline.
//!
//! Errors are organized by concern so callers can tell a per-asset stage
//! failure (data, counted into a batch report) apart from a batch-fatal
//! condition (selection failure, overlapping run).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for haze operations.
#[derive(Error, Debug)]
pub enum HazeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Store access errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised by the media and metadata stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to read store state from disk
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to persist store state to disk
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The hash index file exists but cannot be parsed
    #[error("Malformed hash index {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Per-asset processing errors, organized by stage.
///
/// These are carried inside a [`ProcessOutcome::Failed`] and counted, never
/// escalated to abort a batch.
///
/// [`ProcessOutcome::Failed`]: crate::types::ProcessOutcome::Failed
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Image decoding or resizing failed (corrupt file, unsupported format)
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// The placeholder hash encoder rejected the pixel grid
    #[error("Hash encoding failed for {asset_id}: {message}")]
    Encode { asset_id: String, message: String },

    /// Writing the hash record to the metadata store failed
    #[error("Failed to persist hash for {asset_id}: {source}")]
    Persistence {
        asset_id: String,
        #[source]
        source: StoreError,
    },

    /// Per-asset deadline exceeded
    #[error("Processing timed out for {asset_id} after {timeout_ms}ms")]
    Timeout { asset_id: String, timeout_ms: u64 },
}

impl PipelineError {
    /// Stage label for log lines and aggregate reporting.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Decode { .. } => "decode",
            PipelineError::Encode { .. } => "encode",
            PipelineError::Persistence { .. } => "persist",
            PipelineError::Timeout { .. } => "timeout",
        }
    }
}

/// Batch-fatal errors, reported to the trigger instead of being counted.
#[derive(Error, Debug)]
pub enum BatchError {
    /// Another batch is in flight; this run was rejected as a no-op
    #[error("A batch run is already in progress")]
    AlreadyRunning,

    /// The pending-selection query itself failed, so the run never started
    #[error("Pending selection failed: {0}")]
    Selection(#[source] StoreError),
}

/// Convenience type alias for haze results.
pub type Result<T> = std::result::Result<T, HazeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_stage_labels() {
        let err = PipelineError::Decode {
            path: PathBuf::from("a.jpg"),
            message: "truncated".to_string(),
        };
        assert_eq!(err.stage(), "decode");

        let err = PipelineError::Timeout {
            asset_id: "a.jpg".to_string(),
            timeout_ms: 30_000,
        };
        assert_eq!(err.stage(), "timeout");
    }

    #[test]
    fn test_batch_error_display() {
        let err = BatchError::AlreadyRunning;
        assert!(err.to_string().contains("already in progress"));
    }
}
