//! haze-core - placeholder-hash backfill pipeline.
//!
//! haze computes a compact blurhash placeholder for every image asset in a
//! media library, so consumers can render an instant low-resolution preview
//! while the full image loads. Hashes are generated immediately for new
//! assets and backfilled for existing ones in bounded, idempotent batches.
//!
//! # Architecture
//!
//! ```text
//! Trigger → select pending → resize (32×32) → encode → persist → stats
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use haze_core::{Config, Haze};
//!
//! #[tokio::main]
//! async fn main() -> haze_core::Result<()> {
//!     let haze = Haze::new(Config::load()?)?;
//!
//!     let report = haze.process_batch(None).await?;
//!     println!("backfilled {} asset(s)", report.succeeded);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod pipeline;
pub mod scheduler;
pub mod stats;
pub mod store;
pub mod types;

// Re-exports for convenient access
pub use config::{Config, MetadataBackend};
pub use error::{BatchError, ConfigError, HazeError, PipelineError, Result, StoreError};
pub use pipeline::ProcessingPipeline;
pub use scheduler::{Scheduler, SchedulerHandle};
pub use stats::StatsReporter;
pub use store::{DirMediaStore, JsonMetadataStore, MediaStore, MemoryMetadataStore, MetadataStore};
pub use types::{AssetId, BatchReport, ProcessOutcome, SkipReason, Stats};

use std::sync::Arc;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The main entry point: wires stores, pipeline, and stats together.
pub struct Haze {
    pipeline: ProcessingPipeline,
    stats: StatsReporter,
    config: Config,
}

impl Haze {
    /// Build from configuration, constructing the configured store backends.
    pub fn new(config: Config) -> Result<Self> {
        let media: Arc<dyn MediaStore> = Arc::new(DirMediaStore::new(
            config.media_root(),
            &config.processing,
        ));
        let metadata: Arc<dyn MetadataStore> = match config.store.backend {
            MetadataBackend::Json => Arc::new(JsonMetadataStore::open(config.index_path())?),
            MetadataBackend::Memory => Arc::new(MemoryMetadataStore::new()),
        };
        Ok(Self::with_stores(config, media, metadata))
    }

    /// Build with injected stores (tests, alternative backends).
    pub fn with_stores(
        config: Config,
        media: Arc<dyn MediaStore>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        tracing::debug!("Initializing haze v{VERSION}");
        let pipeline = ProcessingPipeline::new(media.clone(), metadata.clone(), &config);
        let stats = StatsReporter::new(media, metadata);
        Self {
            pipeline,
            stats,
            config,
        }
    }

    /// Process one asset immediately (the upload-hook path).
    pub async fn process_single(&self, asset_id: &str) -> ProcessOutcome {
        self.pipeline.process_single(asset_id).await
    }

    /// Run one backfill batch; `None` uses the configured limit.
    pub async fn process_batch(
        &self,
        limit: Option<usize>,
    ) -> std::result::Result<BatchReport, BatchError> {
        self.pipeline.process_batch(limit).await
    }

    /// Live completed/pending counts.
    pub async fn compute_stats(&self) -> std::result::Result<Stats, StoreError> {
        self.stats.compute_stats().await
    }

    /// Request cooperative shutdown of any in-progress batch.
    pub fn shutdown(&self) {
        self.pipeline.shutdown();
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}
