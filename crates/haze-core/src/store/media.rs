//! Media store: asset enumeration and file lookup.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use walkdir::WalkDir;

use crate::config::ProcessingConfig;
use crate::error::StoreError;
use crate::types::AssetId;

/// Read-only view of the media library.
///
/// The pipeline only ever reads identifiers and file paths; asset ownership
/// stays with whatever system manages the library.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Resolve an asset id to its file path.
    ///
    /// `None` means the id has no usable image file behind it: a normal
    /// condition (non-image attachment, deleted file), not an error.
    async fn file_path(&self, asset_id: &str) -> Option<PathBuf>;

    /// Enumerate every asset id, in ascending order.
    async fn list_assets(&self) -> Result<Vec<AssetId>, StoreError>;

    /// Total number of assets in the library.
    async fn count_total(&self) -> Result<u64, StoreError>;
}

/// Media store backed by a directory tree.
///
/// Asset ids are root-relative paths; only files with a configured image
/// extension count as assets.
pub struct DirMediaStore {
    root: PathBuf,
    supported_formats: Vec<String>,
}

impl DirMediaStore {
    pub fn new(root: PathBuf, config: &ProcessingConfig) -> Self {
        Self {
            root,
            supported_formats: config.supported_formats.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                self.supported_formats
                    .iter()
                    .any(|fmt| fmt.to_lowercase() == ext_lower)
            })
            .unwrap_or(false)
    }

    /// Asset ids must stay inside the media root.
    fn is_clean(asset_id: &str) -> bool {
        let path = Path::new(asset_id);
        !path.is_absolute()
            && path
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
    }

    fn scan(&self) -> Vec<AssetId> {
        let mut assets = Vec::new();
        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !self.is_supported(path) {
                continue;
            }
            if let Ok(rel) = path.strip_prefix(&self.root) {
                assets.push(rel.to_string_lossy().into_owned());
            }
        }
        // Ascending id order keeps pending selection deterministic
        assets.sort();
        assets
    }
}

#[async_trait]
impl MediaStore for DirMediaStore {
    async fn file_path(&self, asset_id: &str) -> Option<PathBuf> {
        if !Self::is_clean(asset_id) {
            return None;
        }
        let path = self.root.join(asset_id);
        if path.is_file() && self.is_supported(&path) {
            Some(path)
        } else {
            None
        }
    }

    async fn list_assets(&self) -> Result<Vec<AssetId>, StoreError> {
        Ok(self.scan())
    }

    async fn count_total(&self) -> Result<u64, StoreError> {
        Ok(self.scan().len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_at(root: &Path) -> DirMediaStore {
        DirMediaStore::new(root.to_path_buf(), &ProcessingConfig::default())
    }

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"x").unwrap();
    }

    #[tokio::test]
    async fn test_list_assets_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.png"));
        touch(&dir.path().join("a.jpg"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("sub/c.webp"));

        let store = store_at(dir.path());
        let assets = store.list_assets().await.unwrap();
        assert_eq!(assets, vec!["a.jpg", "b.png", "sub/c.webp"]);
        assert_eq!(store.count_total().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_file_path_present_and_absent() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("photo.jpg"));
        touch(&dir.path().join("document.pdf"));

        let store = store_at(dir.path());
        assert!(store.file_path("photo.jpg").await.is_some());
        // Non-image attachment resolves to absent, not an error
        assert!(store.file_path("document.pdf").await.is_none());
        assert!(store.file_path("missing.jpg").await.is_none());
    }

    #[tokio::test]
    async fn test_file_path_rejects_escaping_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path());
        assert!(store.file_path("../outside.jpg").await.is_none());
        assert!(store.file_path("/etc/passwd").await.is_none());
    }
}
