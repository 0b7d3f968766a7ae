//! Blob Store
//!
//! Keyed object storage with pluggable backends, shared through `AppState`.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{StorageConfig, StorageProvider};
use crate::error::StorageError;

use super::local::LocalBlobStorage;
use super::s3_client::S3Client;
use super::types::{Blob, Visibility};

/// Trait for blob storage backends
#[async_trait::async_trait]
pub trait BlobStorage: Send + Sync {
    /// Write an object, replacing any previous content
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        visibility: Visibility,
    ) -> Result<(), StorageError>;

    async fn get(&self, key: &str) -> Result<Blob, StorageError>;

    /// Remove an object; a missing key is not an error
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Blob store handle
#[derive(Clone)]
pub struct BlobStore {
    inner: Arc<BlobStoreInner>,
}

struct BlobStoreInner {
    backend: Box<dyn BlobStorage>,

    /// Prefix for public object URLs
    public_base: String,
}

impl BlobStore {
    /// Create with local filesystem storage; objects are served by `/api/blobs`
    pub fn with_local_storage(root: PathBuf, public_url: Option<String>) -> Self {
        Self {
            inner: Arc::new(BlobStoreInner {
                backend: Box::new(LocalBlobStorage::new(root)),
                public_base: public_url.unwrap_or_else(|| "/api/blobs".to_string()),
            }),
        }
    }

    /// Create with S3 storage
    pub fn with_s3_storage(client: S3Client, public_url: Option<String>) -> Self {
        let public_base = public_url.unwrap_or_else(|| client.bucket_url());
        Self {
            inner: Arc::new(BlobStoreInner {
                backend: Box::new(client),
                public_base,
            }),
        }
    }

    /// Build the backend selected by configuration
    pub async fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        match config.provider {
            StorageProvider::Local => {
                tracing::info!("Blob storage: local disk at {}", config.local_root.display());
                Ok(Self::with_local_storage(
                    config.local_root.clone(),
                    config.public_url.clone(),
                ))
            }
            provider => {
                tracing::info!(
                    "Blob storage: {:?} endpoint {} bucket {}",
                    provider,
                    config.endpoint,
                    config.bucket
                );
                let client = S3Client::new(config).await?;
                Ok(Self::with_s3_storage(client, config.public_url.clone()))
            }
        }
    }

    /// Public URL for a stored key
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.inner.public_base.trim_end_matches('/'), key)
    }

    pub async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        visibility: Visibility,
    ) -> Result<(), StorageError> {
        self.inner.backend.put(key, data, content_type, visibility).await
    }

    pub async fn get(&self, key: &str) -> Result<Blob, StorageError> {
        self.inner.backend.get(key).await
    }

    /// Read an object, mapping a missing key to `None`
    pub async fn get_optional(&self, key: &str) -> Result<Option<Blob>, StorageError> {
        match self.inner.backend.get(key).await {
            Ok(blob) => Ok(Some(blob)),
            Err(StorageError::ObjectNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.inner.backend.delete(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_public_url() {
        let temp_dir = TempDir::new().unwrap();
        let store = BlobStore::with_local_storage(temp_dir.path().to_path_buf(), None);
        assert_eq!(store.public_url("builds/a.zip"), "/api/blobs/builds/a.zip");

        let store = BlobStore::with_local_storage(
            temp_dir.path().to_path_buf(),
            Some("https://cdn.example.com/".to_string()),
        );
        assert_eq!(store.public_url("builds/a.zip"), "https://cdn.example.com/builds/a.zip");
    }

    #[tokio::test]
    async fn test_get_optional() {
        let temp_dir = TempDir::new().unwrap();
        let store = BlobStore::with_local_storage(temp_dir.path().to_path_buf(), None);

        assert!(store.get_optional("feedbacks.json").await.unwrap().is_none());

        store
            .put("feedbacks.json", b"[]".to_vec(), "application/json", Visibility::Private)
            .await
            .unwrap();
        let blob = store.get_optional("feedbacks.json").await.unwrap().unwrap();
        assert_eq!(blob.data, b"[]");
    }
}
