//! Core data types for the haze placeholder pipeline.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Identifier of a media asset.
///
/// For the directory-backed media store this is the root-relative path of
/// the file; other stores may use whatever opaque string they key assets by.
pub type AssetId = String;

/// Why an asset was skipped rather than processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The media store has no file reference for this id, which is normal
    /// for non-image attachments; not a failure.
    ResourceNotFound,

    /// Another caller is already processing this asset; the hash record
    /// will be written exactly once by the winner.
    AlreadyInFlight,
}

/// Per-asset outcome of one `process_single` invocation.
///
/// Failures are data from the batch's perspective: they are counted into the
/// [`BatchReport`] and the batch moves on to the next asset.
#[derive(Debug)]
pub enum ProcessOutcome {
    /// Hash computed and persisted.
    Success {
        /// The persisted placeholder hash string.
        hash: String,
    },

    /// Nothing to do for this asset.
    Skipped(SkipReason),

    /// A stage failed; the asset remains pending and is retried naturally
    /// on the next batch run.
    Failed(PipelineError),
}

impl ProcessOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessOutcome::Success { .. })
    }
}

/// Aggregate result of one batch run.
///
/// `processed` counts every attempted asset, so
/// `processed == succeeded + skipped + failed` always holds.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Assets attempted in this run
    pub processed: usize,

    /// Assets whose hash was computed and persisted
    pub succeeded: usize,

    /// Assets skipped (no file reference, or already in flight)
    pub skipped: usize,

    /// Assets that failed a processing stage
    pub failed: usize,
}

impl BatchReport {
    /// Fold a single outcome into the aggregate.
    pub fn record(&mut self, outcome: &ProcessOutcome) {
        self.processed += 1;
        match outcome {
            ProcessOutcome::Success { .. } => self.succeeded += 1,
            ProcessOutcome::Skipped(_) => self.skipped += 1,
            ProcessOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Live completed/pending counts over the whole media store.
///
/// Recomputed on every request; `with_hash + without_hash == total` at every
/// observation point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Total assets known to the media store
    pub total: u64,

    /// Assets with a persisted hash record
    pub with_hash: u64,

    /// Assets still pending
    pub without_hash: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_batch_report_tally() {
        let mut report = BatchReport::default();
        report.record(&ProcessOutcome::Success {
            hash: "LEHV6nWB2yk8".to_string(),
        });
        report.record(&ProcessOutcome::Skipped(SkipReason::ResourceNotFound));
        report.record(&ProcessOutcome::Failed(PipelineError::Decode {
            path: PathBuf::from("broken.jpg"),
            message: "truncated".to_string(),
        }));

        assert_eq!(report.processed, 3);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(
            report.processed,
            report.succeeded + report.skipped + report.failed
        );
    }

    #[test]
    fn test_skip_reason_serde() {
        let json = serde_json::to_string(&SkipReason::ResourceNotFound).unwrap();
        assert_eq!(json, "\"resource_not_found\"");
    }

    #[test]
    fn test_stats_serde_fields() {
        let stats = Stats {
            total: 10,
            with_hash: 4,
            without_hash: 6,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"total\":10"));
        assert!(json.contains("\"with_hash\":4"));
        assert!(json.contains("\"without_hash\":6"));
    }
}
