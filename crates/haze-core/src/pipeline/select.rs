//! Pending-asset selection for backfill batches.

use crate::error::StoreError;
use crate::store::{MediaStore, MetadataStore};
use crate::types::AssetId;

/// Select up to `limit` assets that have no hash record yet.
///
/// Candidates are taken in ascending asset-id order so repeated runs over a
/// growing backlog make forward progress without skipping or re-selecting
/// arbitrarily. Reflects metadata state at query time; assets hashed by a
/// concurrent writer before their id is reached are simply not selected.
pub async fn select_pending(
    media: &dyn MediaStore,
    metadata: &dyn MetadataStore,
    limit: usize,
) -> Result<Vec<AssetId>, StoreError> {
    let mut assets = media.list_assets().await?;
    assets.sort();

    let mut pending = Vec::new();
    for asset_id in assets {
        if pending.len() == limit {
            break;
        }
        if !metadata.has_hash(&asset_id).await? {
            pending.push(asset_id);
        }
    }
    Ok(pending)
}
