//! Blob storage
//!
//! Persists uploaded build artifacts and the feedback queue between
//! requests. Backed by the local filesystem or any S3-compatible service
//! (MinIO, Cloudflare R2, Backblaze B2, AWS S3).

mod blob_store;
mod local;
mod s3_client;
mod types;

pub use blob_store::{BlobStorage, BlobStore};
pub use local::LocalBlobStorage;
pub use s3_client::S3Client;
pub use types::*;
