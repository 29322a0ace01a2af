use super::{join_url, BlobStore};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Blobs as plain files under a root directory.
///
/// The router mounts the root at `/files`, so `public_url` should point there.
pub struct LocalBlobStore {
    root: PathBuf,
    public_url: String,
}

impl LocalBlobStore {
    /// Opens the store, creating `root` if it does not exist.
    pub async fn open(root: impl AsRef<Path>, public_url: &str) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            AppError::Storage(format!("Failed to create {}: {}", root.display(), e))
        })?;

        Ok(Self {
            root,
            public_url: public_url.to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let single_segment = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\', '\0']);

        if single_segment {
            Ok(self.root.join(key))
        } else {
            Err(AppError::Storage(format!("Invalid blob key: {:?}", key)))
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        let path = self.path_for(key)?;
        debug!(key, content_type, size = bytes.len(), "writing blob");

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write blob {}: {}", key, e)))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to delete blob {}: {}",
                key, e
            ))),
        }
    }

    fn public_url(&self, key: &str) -> String {
        join_url(&self.public_url, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    async fn store() -> (TempDir, LocalBlobStore) {
        let dir = TempDir::new().expect("tempdir");
        let store = LocalBlobStore::open(dir.path(), "http://localhost:3000/files")
            .await
            .expect("should open");
        (dir, store)
    }

    #[tokio::test]
    async fn test_put_then_delete() {
        let (_dir, store) = store().await;

        store
            .put("clip", b"video-bytes".to_vec(), "video/mp4")
            .await
            .expect("should put");
        let written = tokio::fs::read(store.root().join("clip")).await.expect("file");
        assert_eq!(written, b"video-bytes");

        store.delete("clip").await.expect("should delete");
        assert!(!store.root().join("clip").exists());
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let (_dir, store) = store().await;
        store.delete("never-written").await.expect("should be a no-op");
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let (_dir, store) = store().await;
        store.put("k", vec![1], "image/png").await.expect("first");
        store.put("k", vec![2, 2], "image/png").await.expect("second");

        let written = tokio::fs::read(store.root().join("k")).await.expect("file");
        assert_eq!(written, vec![2, 2]);
    }

    #[rstest]
    #[case("")]
    #[case(".")]
    #[case("..")]
    #[case("../escape")]
    #[case("nested/key")]
    #[case("back\\slash")]
    #[tokio::test]
    async fn test_rejects_multi_segment_keys(#[case] key: &str) {
        let (_dir, store) = store().await;
        let err = store
            .put(key, vec![0], "application/octet-stream")
            .await
            .expect_err("should reject");
        assert!(matches!(err, AppError::Storage(_)));
    }

    #[tokio::test]
    async fn test_public_url() {
        let (_dir, store) = store().await;
        assert_eq!(
            store.public_url("abc-123"),
            "http://localhost:3000/files/abc-123"
        );
    }
}
