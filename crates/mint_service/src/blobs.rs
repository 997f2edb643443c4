//! Blob storage for uploaded originals.
//!
//! Keys are content addresses (`sha256-<hex>`), so writing the same bytes
//! twice is harmless and blobs never change once written.

use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

use mint_core::{Error, Result};

use crate::config::Config;

/// Bytes plus the content type they were stored with.
#[derive(Debug, Clone)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` under `key` and returns the key.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String>;

    async fn get(&self, key: &str) -> Result<Blob>;
}

pub fn content_key(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256-{}", hex::encode(hasher.finalize()))
}

// ============================================================================
// S3 / MinIO
// ============================================================================

#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    /// Path-style client against the configured endpoint, so MinIO works
    /// the same as AWS.
    pub async fn from_config(config: &Config) -> Self {
        let region_provider =
            RegionProviderChain::default_provider().or_else(Region::new(config.s3_region.clone()));
        let aws_config = aws_config::from_env().region(region_provider).load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
            .force_path_style(true)
            .endpoint_url(&config.s3_endpoint)
            .build();
        Self::new(Client::from_conf(s3_config), config.s3_bucket.clone())
    }

    /// Creates the bucket on first use.
    pub async fn ensure_bucket(&self) -> Result<()> {
        if self.client.head_bucket().bucket(&self.bucket).send().await.is_ok() {
            return Ok(());
        }

        match self.client.create_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {
                info!(bucket = %self.bucket, "Created blob bucket");
                Ok(())
            }
            Err(e)
                if e.as_service_error().is_some_and(|s| {
                    s.is_bucket_already_owned_by_you() || s.is_bucket_already_exists()
                }) =>
            {
                Ok(())
            }
            Err(e) => Err(s3_error("create bucket", e)),
        }
    }
}

/// Network-level failures are worth retrying; service answers are not.
fn s3_error<E, R>(action: &str, e: SdkError<E, R>) -> Error
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = format!("S3 {} failed: {}", action, DisplayErrorContext(&e));
    match e {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            Error::TransientStorage(message)
        }
        _ => Error::Storage(message),
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| s3_error("upload", e))?;

        debug!(key, size, "Stored blob");
        Ok(key.to_string())
    }

    async fn get(&self, key: &str) -> Result<Blob> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| s3_error("download", e))?;

        let content_type = output
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| Error::TransientStorage(format!("S3 body read failed: {}", e)))?
            .into_bytes()
            .to_vec();

        Ok(Blob { bytes, content_type })
    }
}

// ============================================================================
// In-memory
// ============================================================================

#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Blob>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let blob = Blob { bytes, content_type: content_type.to_string() };
        self.blobs.write().await.insert(key.to_string(), blob);
        Ok(key.to_string())
    }

    async fn get(&self, key: &str) -> Result<Blob> {
        self.blobs
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| Error::Storage(format!("blob '{}' is missing", key)))
    }
}
