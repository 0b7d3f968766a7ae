//! S3-compatible backend (MinIO, R2, B2, AWS)

use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Credentials, Region},
    primitives::ByteStream,
    types::ObjectCannedAcl,
    Client,
};

use crate::config::{StorageConfig, StorageProvider};
use crate::error::StorageError;

use super::blob_store::BlobStorage;
use super::types::{Blob, Visibility};

const DEFAULT_REGION: &str = "us-east-1";

pub struct S3Client {
    client: Client,
    bucket: String,
    endpoint: String,
    /// R2 rejects canned ACLs; public reads are a bucket setting there
    canned_acl: bool,
}

/// Classify an SDK failure for `key` by its rendered message
fn classify(op: &str, key: &str, message: String) -> StorageError {
    if message.contains("NoSuchKey") || message.contains("NotFound") || message.contains("404") {
        StorageError::ObjectNotFound(key.to_string())
    } else if message.contains("AccessDenied") || message.contains("403") {
        StorageError::AccessDenied(key.to_string())
    } else {
        StorageError::SdkError(format!("{} {}: {}", op, key, message))
    }
}

impl S3Client {
    pub async fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        if config.access_key.is_empty() || config.secret_key.is_empty() {
            return Err(StorageError::ConnectionFailed(
                "S3 credentials are not configured".to_string(),
            ));
        }

        let credentials =
            Credentials::new(&config.access_key, &config.secret_key, None, None, "toolbox");
        let region = config.region.as_deref().unwrap_or(DEFAULT_REGION).to_string();

        let sdk_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint)
            .region(Region::new(region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        let client = Client::from_conf(sdk_config);
        if let Err(e) = client.head_bucket().bucket(&config.bucket).send().await {
            tracing::warn!(bucket = %config.bucket, "Bucket check failed: {}", e);
        }

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            canned_acl: config.provider != StorageProvider::R2,
        })
    }

    /// Path-style URL of the bucket on the configured endpoint
    pub fn bucket_url(&self) -> String {
        format!("{}/{}", self.endpoint, self.bucket)
    }
}

#[async_trait::async_trait]
impl BlobStorage for S3Client {
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        visibility: Visibility,
    ) -> Result<(), StorageError> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data));
        if visibility == Visibility::Public && self.canned_acl {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }

        request
            .send()
            .await
            .map_err(|e| classify("put", key, e.to_string()))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Blob, StorageError> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify("get", key, e.to_string()))?;

        let content_type = response.content_type().map(str::to_string);
        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::SdkError(format!("read {}: {}", key, e)))?
            .into_bytes()
            .to_vec();

        Ok(Blob { content_type, data })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify("delete", key, e.to_string()))?;
        tracing::debug!(key = %key, "Deleted object");
        Ok(())
    }
}
