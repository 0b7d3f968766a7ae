//! Application state management

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::feedback::{FeedbackStore, SpreadsheetSink};
use crate::storage::BlobStore;
use crate::temp_files::TempFiles;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    blobs: BlobStore,
    temp_files: TempFiles,
    feedback: FeedbackStore,
    sheets: Arc<dyn SpreadsheetSink>,
}

impl AppState {
    pub fn new(config: Config, blobs: BlobStore, sheets: Arc<dyn SpreadsheetSink>) -> Self {
        let temp_files = TempFiles::new(
            config.uploads.temp_dir.clone(),
            Duration::from_secs(config.uploads.temp_file_ttl_secs),
        );
        let feedback = FeedbackStore::new(blobs.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                blobs,
                temp_files,
                feedback,
                sheets,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the blob store
    pub fn blobs(&self) -> &BlobStore {
        &self.inner.blobs
    }

    /// Get the temp file manager
    pub fn temp_files(&self) -> &TempFiles {
        &self.inner.temp_files
    }

    pub fn feedback(&self) -> &FeedbackStore {
        &self.inner.feedback
    }

    pub fn sheets(&self) -> &dyn SpreadsheetSink {
        self.inner.sheets.as_ref()
    }

    /// Per-file upload cap in bytes
    pub fn max_upload(&self) -> usize {
        self.inner.config.uploads.max_file_size
    }
}
