//! Feedback intake and spreadsheet sync
//!
//! Submissions are queued in a single JSON blob. The cron job drains the
//! queue into a spreadsheet and deletes the blob once the rows are written.

mod sheets;

pub use sheets::{HttpSheetsSink, SheetsError, SpreadsheetSink};

use std::str::FromStr;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::error::StorageError;
use crate::storage::{BlobStore, Visibility};

/// Blob key of the pending feedback queue
pub const FEEDBACK_KEY: &str = "feedbacks.json";

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Stored feedback is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error(transparent)]
    Sheets(#[from] SheetsError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Suggestion,
    Bug,
}

impl FeedbackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackKind::Suggestion => "suggestion",
            FeedbackKind::Bug => "bug",
        }
    }
}

impl FromStr for FeedbackKind {
    type Err = FeedbackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "suggestion" => Ok(FeedbackKind::Suggestion),
            "bug" => Ok(FeedbackKind::Bug),
            other => Err(FeedbackError::InvalidInput(format!(
                "Unknown feedback type: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: FeedbackKind,
    pub description: String,
    #[serde(default)]
    pub email: String,
}

impl Feedback {
    fn into_row(self) -> Vec<String> {
        vec![
            self.timestamp,
            self.kind.as_str().to_string(),
            self.description,
            self.email,
        ]
    }
}

/// Result of a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Empty,
    Synced(usize),
}

/// Feedback queue over the blob store
#[derive(Clone)]
pub struct FeedbackStore {
    blobs: BlobStore,
    /// Serializes read-modify-write cycles on the queue blob
    lock: Arc<Mutex<()>>,
}

impl FeedbackStore {
    pub fn new(blobs: BlobStore) -> Self {
        Self {
            blobs,
            lock: Arc::new(Mutex::new(())),
        }
    }

    async fn load(&self) -> Result<Vec<Feedback>, FeedbackError> {
        match self.blobs.get_optional(FEEDBACK_KEY).await? {
            Some(obj) if !obj.data.iter().all(u8::is_ascii_whitespace) => {
                Ok(serde_json::from_slice(&obj.data)?)
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Feedback waiting to be synced
    pub async fn pending(&self) -> Result<Vec<Feedback>, FeedbackError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    /// Append one submission to the queue
    pub async fn submit(
        &self,
        kind: FeedbackKind,
        description: &str,
        email: Option<&str>,
    ) -> Result<Feedback, FeedbackError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(FeedbackError::InvalidInput(
                "Description is required".to_string(),
            ));
        }

        let entry = Feedback {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            kind,
            description: description.to_string(),
            email: email.map(str::trim).unwrap_or_default().to_string(),
        };

        let _guard = self.lock.lock().await;
        let mut queue = self.load().await?;
        queue.push(entry.clone());
        self.blobs
            .put(
                FEEDBACK_KEY,
                serde_json::to_vec(&queue)?,
                "application/json",
                Visibility::Private,
            )
            .await?;

        tracing::info!(kind = kind.as_str(), queued = queue.len(), "Feedback received");
        Ok(entry)
    }

    /// Append every queued entry to `sink`, then delete the queue. The queue
    /// is left untouched when the sink fails.
    pub async fn sync(&self, sink: &dyn SpreadsheetSink) -> Result<SyncOutcome, FeedbackError> {
        let _guard = self.lock.lock().await;
        let queue = self.load().await?;
        if queue.is_empty() {
            return Ok(SyncOutcome::Empty);
        }

        let count = queue.len();
        let rows = queue.into_iter().map(Feedback::into_row).collect();
        sink.append_rows(rows).await?;
        self.blobs.delete(FEEDBACK_KEY).await?;

        tracing::info!(rows = count, "Feedback synced to spreadsheet");
        Ok(SyncOutcome::Synced(count))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex as SyncMutex;
    use tempfile::TempDir;

    /// Sink that records rows, or fails when `fail` is set
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub rows: SyncMutex<Vec<Vec<String>>>,
        pub fail: bool,
    }

    #[async_trait]
    impl SpreadsheetSink for RecordingSink {
        async fn append_rows(&self, rows: Vec<Vec<String>>) -> Result<usize, SheetsError> {
            if self.fail {
                return Err(SheetsError::Api {
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            let n = rows.len();
            self.rows.lock().extend(rows);
            Ok(n)
        }
    }

    fn store(dir: &TempDir) -> FeedbackStore {
        FeedbackStore::new(BlobStore::with_local_storage(dir.path().to_path_buf(), None))
    }

    #[tokio::test]
    async fn test_submit_appends() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.submit(FeedbackKind::Bug, "broken", None).await.unwrap();
        store
            .submit(FeedbackKind::Suggestion, " more tools ", Some("a@b.c"))
            .await
            .unwrap();

        let pending = store.pending().await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[1].description, "more tools");
        assert_eq!(pending[1].email, "a@b.c");
        assert!(store.submit(FeedbackKind::Bug, "  ", None).await.is_err());
    }

    #[tokio::test]
    async fn test_sync_drains_queue() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let sink = RecordingSink::default();

        assert_eq!(store.sync(&sink).await.unwrap(), SyncOutcome::Empty);

        store.submit(FeedbackKind::Bug, "broken", Some("x@y.z")).await.unwrap();
        assert_eq!(store.sync(&sink).await.unwrap(), SyncOutcome::Synced(1));

        let rows = sink.rows.lock().clone();
        assert_eq!(rows[0][1..], ["bug", "broken", "x@y.z"]);
        assert!(store.pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_sync_keeps_queue() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.submit(FeedbackKind::Bug, "broken", None).await.unwrap();

        let sink = RecordingSink {
            fail: true,
            ..Default::default()
        };
        assert!(store.sync(&sink).await.is_err());
        assert_eq!(store.pending().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_submissions_are_not_lost() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .submit(FeedbackKind::Suggestion, &format!("idea {}", i), None)
                        .await
                        .unwrap();
                })
            })
            .collect();
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(store.pending().await.unwrap().len(), 10);
    }
}
