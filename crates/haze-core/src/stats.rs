//! Live completed/pending statistics over the media store.

use std::sync::Arc;

use crate::error::StoreError;
use crate::store::{MediaStore, MetadataStore};
use crate::types::Stats;

/// Computes hash-coverage counts from live store state.
///
/// Nothing is cached: every call reflects the most recent completed writes,
/// possibly stale by the duration of an in-flight batch.
pub struct StatsReporter {
    media: Arc<dyn MediaStore>,
    metadata: Arc<dyn MetadataStore>,
}

impl StatsReporter {
    pub fn new(media: Arc<dyn MediaStore>, metadata: Arc<dyn MetadataStore>) -> Self {
        Self { media, metadata }
    }

    /// Recompute `{total, with_hash, without_hash}`.
    ///
    /// The invariant `with_hash + without_hash == total` holds at every
    /// observation. A hashed count exceeding the total (records for assets
    /// the media store no longer lists) is clamped and logged as a
    /// consistency warning rather than crashing or going negative.
    pub async fn compute_stats(&self) -> Result<Stats, StoreError> {
        let total = self.media.count_total().await?;
        let hashed = self.metadata.count_hashed().await?;

        if hashed > total {
            tracing::warn!(
                "Hash records ({hashed}) exceed known assets ({total}); clamping pending to zero"
            );
        }
        let without_hash = total.saturating_sub(hashed);

        Ok(Stats {
            total,
            with_hash: total - without_hash,
            without_hash,
        })
    }
}
