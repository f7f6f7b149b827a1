//! Pipeline orchestration - resize, encode, and persist per asset.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use tokio::time::timeout;

use crate::config::{Config, LimitsConfig, ProcessingConfig};
use crate::error::{BatchError, PipelineError};
use crate::store::{MediaStore, MetadataStore};
use crate::types::{BatchReport, ProcessOutcome, SkipReason};

use super::encode::encode_grid;
use super::resize::ImageResizer;
use super::select::select_pending;
use super::single_flight::SingleFlight;

/// Orchestrates hash generation for single assets and backfill batches.
///
/// Holds both single-flight controls: a per-asset in-flight registry and a
/// batch gate allowing one batch run system-wide.
pub struct ProcessingPipeline {
    media: Arc<dyn MediaStore>,
    metadata: Arc<dyn MetadataStore>,
    resizer: ImageResizer,
    in_flight: Arc<SingleFlight>,
    batch_gate: tokio::sync::Mutex<()>,
    shutdown: AtomicBool,
    processing: ProcessingConfig,
    limits: LimitsConfig,
}

impl ProcessingPipeline {
    pub fn new(media: Arc<dyn MediaStore>, metadata: Arc<dyn MetadataStore>, config: &Config) -> Self {
        Self {
            media,
            metadata,
            resizer: ImageResizer::new(config.limits.clone()),
            in_flight: SingleFlight::new(),
            batch_gate: tokio::sync::Mutex::new(()),
            shutdown: AtomicBool::new(false),
            processing: config.processing.clone(),
            limits: config.limits.clone(),
        }
    }

    /// Process one asset: resize, encode, persist.
    ///
    /// Failures are returned as data, never raised; a missing file reference
    /// is a skip. The whole stage sequence is bounded by the per-asset
    /// deadline, and the pixel grid is dropped on every exit path.
    pub async fn process_single(&self, asset_id: &str) -> ProcessOutcome {
        let _claim = match self.in_flight.try_begin(asset_id) {
            Some(claim) => claim,
            None => return ProcessOutcome::Skipped(SkipReason::AlreadyInFlight),
        };

        let Some(path) = self.media.file_path(asset_id).await else {
            return ProcessOutcome::Skipped(SkipReason::ResourceNotFound);
        };

        let deadline = Duration::from_millis(self.limits.process_timeout_ms);
        match timeout(deadline, self.run_stages(asset_id, &path)).await {
            Ok(Ok(hash)) => ProcessOutcome::Success { hash },
            Ok(Err(e)) => ProcessOutcome::Failed(e),
            Err(_) => ProcessOutcome::Failed(PipelineError::Timeout {
                asset_id: asset_id.to_string(),
                timeout_ms: self.limits.process_timeout_ms,
            }),
        }
    }

    async fn run_stages(&self, asset_id: &str, path: &Path) -> Result<String, PipelineError> {
        let grid = self.resizer.resize(path).await?;
        let hash = encode_grid(asset_id, &grid)?;
        self.metadata
            .set_hash(asset_id, &hash)
            .await
            .map_err(|source| PipelineError::Persistence {
                asset_id: asset_id.to_string(),
                source,
            })?;
        Ok(hash)
    }

    /// Run one backfill batch over up to `limit` pending assets.
    ///
    /// Assets are attempted in selection order across at most
    /// `processing.parallel_workers` concurrent slots; completion order is
    /// unspecified. Per-asset failures are counted and the batch continues.
    /// A second concurrent call is rejected with `AlreadyRunning`.
    pub async fn process_batch(&self, limit: Option<usize>) -> Result<BatchReport, BatchError> {
        let _gate = match self.batch_gate.try_lock() {
            Ok(gate) => gate,
            Err(_) => return Err(BatchError::AlreadyRunning),
        };

        let limit = limit.unwrap_or(self.processing.batch_limit);
        let pending = select_pending(self.media.as_ref(), self.metadata.as_ref(), limit)
            .await
            .map_err(BatchError::Selection)?;
        tracing::info!("Selected {} pending asset(s)", pending.len());

        let workers = self.processing.parallel_workers.max(1);
        let mut report = BatchReport::default();
        let mut cancelled = 0usize;

        let mut outcomes = stream::iter(pending)
            .map(|asset_id| async move {
                // Cooperative cancellation: stop picking up new assets,
                // let in-flight ones finish or time out.
                if self.is_shutting_down() {
                    return (asset_id, None);
                }
                let outcome = self.process_single(&asset_id).await;
                (asset_id, Some(outcome))
            })
            .buffered(workers);

        while let Some((asset_id, outcome)) = outcomes.next().await {
            match outcome {
                Some(outcome) => {
                    log_outcome(&asset_id, &outcome);
                    report.record(&outcome);
                }
                None => cancelled += 1,
            }
        }

        if cancelled > 0 {
            tracing::warn!("Batch stopped early, {cancelled} asset(s) left unattempted");
        }
        tracing::info!(
            "Batch done: {} succeeded, {} skipped, {} failed",
            report.succeeded,
            report.skipped,
            report.failed
        );
        Ok(report)
    }

    /// Request cooperative shutdown of any in-progress batch.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

fn log_outcome(asset_id: &str, outcome: &ProcessOutcome) {
    match outcome {
        ProcessOutcome::Success { hash } => {
            tracing::debug!("Hashed {asset_id}: {hash}");
        }
        ProcessOutcome::Skipped(reason) => {
            tracing::debug!("Skipped {asset_id}: {reason:?}");
        }
        ProcessOutcome::Failed(e) => {
            tracing::warn!("Failed {asset_id} at {}: {e}", e.stage());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DirMediaStore, MemoryMetadataStore};
    use image::DynamicImage;
    use std::path::PathBuf;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        DynamicImage::new_rgb8(width, height).save(&path).unwrap();
        path
    }

    fn pipeline_over(
        root: &Path,
        metadata: Arc<MemoryMetadataStore>,
    ) -> ProcessingPipeline {
        let config = Config::default();
        let media = Arc::new(DirMediaStore::new(root.to_path_buf(), &config.processing));
        ProcessingPipeline::new(media, metadata, &config)
    }

    #[tokio::test]
    async fn test_process_single_persists_hash() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "photo.png", 200, 100);
        let metadata = Arc::new(MemoryMetadataStore::new());
        let pipeline = pipeline_over(dir.path(), metadata.clone());

        let outcome = pipeline.process_single("photo.png").await;
        assert!(outcome.is_success());
        assert!(metadata.has_hash("photo.png").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_file_reference_is_skip() {
        let dir = tempfile::tempdir().unwrap();
        let metadata = Arc::new(MemoryMetadataStore::new());
        let pipeline = pipeline_over(dir.path(), metadata.clone());

        let outcome = pipeline.process_single("ghost.png").await;
        assert!(matches!(
            outcome,
            ProcessOutcome::Skipped(SkipReason::ResourceNotFound)
        ));
        assert!(!metadata.has_hash("ghost.png").await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_file_fails_without_record_and_batch_continues() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "good.png", 64, 64);
        let corrupt = dir.path().join("bad.png");
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&[0xAB; 32]);
        std::fs::write(&corrupt, bytes).unwrap();

        let metadata = Arc::new(MemoryMetadataStore::new());
        let pipeline = pipeline_over(dir.path(), metadata.clone());

        let report = pipeline.process_batch(None).await.unwrap();
        assert_eq!(report.processed, 2);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);
        assert!(metadata.has_hash("good.png").await.unwrap());
        assert!(!metadata.has_hash("bad.png").await.unwrap());
    }

    #[tokio::test]
    async fn test_batch_single_flight_rejects_overlap() {
        let dir = tempfile::tempdir().unwrap();
        let metadata = Arc::new(MemoryMetadataStore::new());
        let pipeline = pipeline_over(dir.path(), metadata);

        let _gate = pipeline.batch_gate.lock().await;
        let result = pipeline.process_batch(None).await;
        assert!(matches!(result, Err(BatchError::AlreadyRunning)));
    }

    #[tokio::test]
    async fn test_batch_respects_limit() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.png", "b.png", "c.png"] {
            write_png(dir.path(), name, 32, 32);
        }
        let metadata = Arc::new(MemoryMetadataStore::new());
        let pipeline = pipeline_over(dir.path(), metadata.clone());

        let report = pipeline.process_batch(Some(2)).await.unwrap();
        assert_eq!(report.processed, 2);
        assert_eq!(metadata.count_hashed().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_shutdown_stops_new_pickups() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "a.png", 32, 32);
        let metadata = Arc::new(MemoryMetadataStore::new());
        let pipeline = pipeline_over(dir.path(), metadata);

        pipeline.shutdown();
        let report = pipeline.process_batch(None).await.unwrap();
        assert_eq!(report.processed, 0);
    }
}
