use super::{join_url, BlobStore};
use crate::types::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// A blob held in memory together with its declared content type.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Process-local blob store; contents vanish on restart.
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, StoredBlob>>,
    public_url: String,
}

impl MemoryBlobStore {
    pub fn new(public_url: &str) -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            public_url: public_url.to_string(),
        }
    }

    pub fn get(&self, key: &str) -> Option<StoredBlob> {
        self.blobs.read().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.blobs.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        self.blobs.write().insert(
            key.to_string(),
            StoredBlob {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.blobs.write().remove(key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        join_url(&self.public_url, key)
    }
}
