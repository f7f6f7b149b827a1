//! Metadata store: persisted hash records, one per asset.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;

/// Keyed hash-record storage.
///
/// `set_hash` must be safe under concurrent callers: at most one record per
/// asset exists afterwards, with no torn or lost update. Records are created
/// or overwritten by the pipeline and never deleted here.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Whether a hash record exists for this asset.
    async fn has_hash(&self, asset_id: &str) -> Result<bool, StoreError>;

    /// The stored hash, if any.
    async fn hash(&self, asset_id: &str) -> Result<Option<String>, StoreError>;

    /// Create or overwrite the hash record for an asset.
    async fn set_hash(&self, asset_id: &str, hash: &str) -> Result<(), StoreError>;

    /// Number of assets with a hash record.
    async fn count_hashed(&self) -> Result<u64, StoreError>;
}

/// Metadata store backed by a single JSON index file.
///
/// The whole index is held in memory behind a write lock and rewritten
/// atomically (temp file + rename) on every `set_hash`, so readers never
/// observe a partially written file.
pub struct JsonMetadataStore {
    path: PathBuf,
    records: RwLock<BTreeMap<String, String>>,
}

impl JsonMetadataStore {
    /// Open the index at `path`, loading existing records.
    ///
    /// A missing file is an empty index; a present but unparseable file is
    /// an error rather than silently dropping records.
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        let records = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|source| StoreError::Read {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&content).map_err(|source| StoreError::Malformed {
                path: path.clone(),
                source,
            })?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    fn persist(&self, records: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(records).map_err(|source| {
            StoreError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|source| StoreError::Write {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

#[async_trait]
impl MetadataStore for JsonMetadataStore {
    async fn has_hash(&self, asset_id: &str) -> Result<bool, StoreError> {
        Ok(self.records.read().await.contains_key(asset_id))
    }

    async fn hash(&self, asset_id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.records.read().await.get(asset_id).cloned())
    }

    async fn set_hash(&self, asset_id: &str, hash: &str) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        records.insert(asset_id.to_string(), hash.to_string());
        self.persist(&records)
    }

    async fn count_hashed(&self) -> Result<u64, StoreError> {
        Ok(self.records.read().await.len() as u64)
    }
}

/// In-memory metadata store for tests and dry runs.
#[derive(Default)]
pub struct MemoryMetadataStore {
    records: RwLock<BTreeMap<String, String>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn has_hash(&self, asset_id: &str) -> Result<bool, StoreError> {
        Ok(self.records.read().await.contains_key(asset_id))
    }

    async fn hash(&self, asset_id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.records.read().await.get(asset_id).cloned())
    }

    async fn set_hash(&self, asset_id: &str, hash: &str) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(asset_id.to_string(), hash.to_string());
        Ok(())
    }

    async fn count_hashed(&self) -> Result<u64, StoreError> {
        Ok(self.records.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryMetadataStore::new();
        assert!(!store.has_hash("a.jpg").await.unwrap());

        store.set_hash("a.jpg", "LEHV6nWB2yk8").await.unwrap();
        assert!(store.has_hash("a.jpg").await.unwrap());
        assert_eq!(
            store.hash("a.jpg").await.unwrap().as_deref(),
            Some("LEHV6nWB2yk8")
        );
        assert_eq!(store.count_hashed().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_overwrite_keeps_single_record() {
        let store = MemoryMetadataStore::new();
        store.set_hash("a.jpg", "first").await.unwrap();
        store.set_hash("a.jpg", "second").await.unwrap();

        assert_eq!(store.count_hashed().await.unwrap(), 1);
        assert_eq!(store.hash("a.jpg").await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_json_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hashes.json");

        let store = JsonMetadataStore::open(path.clone()).unwrap();
        store.set_hash("a.jpg", "LEHV6nWB2yk8").await.unwrap();
        store.set_hash("b.png", "L9AS}j^-0g4n").await.unwrap();
        drop(store);

        let reopened = JsonMetadataStore::open(path).unwrap();
        assert_eq!(reopened.count_hashed().await.unwrap(), 2);
        assert_eq!(
            reopened.hash("a.jpg").await.unwrap().as_deref(),
            Some("LEHV6nWB2yk8")
        );
    }

    #[tokio::test]
    async fn test_json_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonMetadataStore::open(dir.path().join("absent.json")).unwrap();
        assert_eq!(store.count_hashed().await.unwrap(), 0);
    }

    #[test]
    fn test_json_store_rejects_malformed_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hashes.json");
        std::fs::write(&path, "not json at all").unwrap();

        let result = JsonMetadataStore::open(path);
        assert!(matches!(result, Err(StoreError::Malformed { .. })));
    }

    #[tokio::test]
    async fn test_json_store_concurrent_writers() {
        let dir = tempfile::tempdir().unwrap();
        let store =
            std::sync::Arc::new(JsonMetadataStore::open(dir.path().join("hashes.json")).unwrap());

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .set_hash(&format!("asset-{i}.jpg"), "LEHV6nWB2yk8")
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.count_hashed().await.unwrap(), 8);
    }
}
