//! Blob storage for uploaded images and videos.
//!
//! Uploads are addressed by an opaque key chosen by the caller (the upload
//! handler uses a fresh UUID). Each backend also knows the public URL at which
//! a stored key can be fetched; that URL is what gets linked onto records.

pub mod local;
pub mod memory;

pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;

use crate::types::Result;
use crate::utils::toml_config::{StorageBackend, StorageConfig};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` under `key`, replacing anything already there.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()>;

    /// Removes `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// URL at which `key` can be fetched once stored.
    fn public_url(&self, key: &str) -> String;
}

/// Storage backend selection
#[derive(Debug, Clone, PartialEq)]
pub enum StorageProvider {
    Local { root: String, public_url: String },
    Memory { public_url: String },
}

impl StorageProvider {
    pub fn from_config(config: &StorageConfig) -> Self {
        match config.backend {
            StorageBackend::Local => StorageProvider::Local {
                root: config.root.clone(),
                public_url: config.public_url.clone(),
            },
            StorageBackend::Memory => StorageProvider::Memory {
                public_url: config.public_url.clone(),
            },
        }
    }

    pub async fn create_store(&self) -> Result<Arc<dyn BlobStore>> {
        match self {
            StorageProvider::Local { root, public_url } => {
                let store = LocalBlobStore::open(root, public_url).await?;
                Ok(Arc::new(store))
            }
            StorageProvider::Memory { public_url } => Ok(Arc::new(MemoryBlobStore::new(public_url))),
        }
    }
}

/// Joins a base URL and a key with exactly one slash between them.
pub(crate) fn join_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}
