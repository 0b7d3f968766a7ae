//! Temporary output files
//!
//! Generated documents are written to a private temp directory, offered for
//! download, and removed by a one-shot timer. A deletion that fails is logged
//! and forgotten; a restart leaves stragglers behind.

use std::collections::HashSet;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;

use crate::upload::sanitize_file_name;

#[derive(Debug, Error)]
pub enum TempPathError {
    #[error("Invalid file path")]
    Invalid,

    #[error("File not found")]
    NotFound,
}

/// Temp file manager
#[derive(Clone)]
pub struct TempFiles {
    inner: Arc<TempFilesInner>,
}

struct TempFilesInner {
    dir: PathBuf,
    ttl: Duration,
    /// Files written and not yet deleted
    pending: Mutex<HashSet<PathBuf>>,
}

impl TempFiles {
    pub fn new(dir: PathBuf, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(TempFilesInner {
                dir,
                ttl,
                pending: Mutex::new(HashSet::new()),
            }),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    /// Number of files awaiting their scheduled deletion
    pub fn pending_count(&self) -> usize {
        self.inner.pending.lock().len()
    }

    /// Write `data` under a unique name and schedule its deletion
    pub async fn persist(&self, prefix: &str, extension: &str, data: &[u8]) -> io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.inner.dir).await?;

        let unique = uuid::Uuid::new_v4().simple().to_string();
        let name = format!(
            "{}_{}_{}.{}",
            sanitize_file_name(prefix),
            chrono::Utc::now().timestamp_millis(),
            &unique[..8],
            extension
        );
        let path = self.inner.dir.join(name);

        tokio::fs::write(&path, data).await?;
        self.inner.pending.lock().insert(path.clone());

        tracing::debug!(path = %path.display(), size = data.len(), "Wrote temp file");

        self.schedule_deletion(path.clone());
        Ok(path)
    }

    /// Delete `path` once the TTL elapses. No cancellation, no retry.
    fn schedule_deletion(&self, path: PathBuf) {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            tokio::time::sleep(inner.ttl).await;
            match tokio::fs::remove_file(&path).await {
                Ok(()) => tracing::debug!(path = %path.display(), "Deleted temp file"),
                Err(e) => {
                    tracing::error!(path = %path.display(), "Error deleting temp file: {}", e)
                }
            }
            inner.pending.lock().remove(&path);
        });
    }

    /// Download URL for a file written by [`persist`](Self::persist)
    pub fn download_url(&self, path: &Path) -> String {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("/api/download?file={}", urlencoding::encode(&name))
    }

    /// Resolve a requested download path, refusing anything outside the temp
    /// directory. Relative names are taken relative to it.
    pub async fn resolve(&self, requested: &str) -> Result<PathBuf, TempPathError> {
        if requested.is_empty() || requested.contains('\0') {
            return Err(TempPathError::Invalid);
        }

        let requested = Path::new(requested);
        if requested
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(TempPathError::Invalid);
        }

        let candidate = if requested.is_absolute() {
            requested.to_path_buf()
        } else {
            self.inner.dir.join(requested)
        };

        let root = match tokio::fs::canonicalize(&self.inner.dir).await {
            Ok(root) => root,
            Err(_) => return Err(TempPathError::NotFound),
        };

        // A lexical check first so a missing file outside the root reads as invalid
        if candidate.is_absolute()
            && !candidate.starts_with(&self.inner.dir)
            && !candidate.starts_with(&root)
        {
            return Err(TempPathError::Invalid);
        }

        let resolved = tokio::fs::canonicalize(&candidate)
            .await
            .map_err(|_| TempPathError::NotFound)?;

        // Symlinks may still point elsewhere
        if !resolved.starts_with(&root) || resolved == root {
            return Err(TempPathError::Invalid);
        }

        if !tokio::fs::metadata(&resolved)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
        {
            return Err(TempPathError::NotFound);
        }

        Ok(resolved)
    }
}
