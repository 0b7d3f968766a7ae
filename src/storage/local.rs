//! Local filesystem blob storage

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::error::StorageError;

use super::blob_store::BlobStorage;
use super::types::{Blob, Visibility};

/// Stores each object as a file below `root`, keyed by its relative path
pub struct LocalBlobStorage {
    root: PathBuf,
}

impl LocalBlobStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Keys are relative paths made of plain components only
    fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let safe = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(StorageError::AccessDenied(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait::async_trait]
impl BlobStorage for LocalBlobStorage {
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        _content_type: &str,
        _visibility: Visibility,
    ) -> Result<(), StorageError> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let size = data.len();
        tokio::fs::write(&path, data).await?;

        tracing::debug!(key = %key, size = size, "Stored blob on local disk");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Blob, StorageError> {
        let path = self.object_path(key)?;
        let data = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::ObjectNotFound(key.to_string()),
            _ => StorageError::Local(e),
        })?;

        let content_type = mime_guess::from_path(&path)
            .first()
            .map(|m| m.essence_str().to_string());
        Ok(Blob { content_type, data })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.object_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Local(e)),
        }
    }
}
