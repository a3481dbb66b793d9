//! Unified storage client.
//!
//! [`ObjectStorageClient`] is the single entry point callers use. It holds the
//! bucket and object implementations for the backend chosen at startup and
//! forwards every call to them unchanged.

use bytes::Bytes;
use std::sync::Arc;

use crate::error::Result;
use crate::traits::{BucketOperations, ObjectOperations};
use crate::types::StorageType;

/// Storage facade over one backend.
///
/// # Example
///
/// ```ignore
/// use object_storage_kit::{StorageConfig, StorageFactory, StorageType};
///
/// let config = StorageConfig::new(StorageType::S3, "us-east-1", "my-bucket");
/// let client = StorageFactory::create(&config)?;
///
/// client.create_bucket("my-bucket").await?;
/// client.put_object("my-bucket", "hello.txt", "hello".into()).await?;
/// let keys = client.list_objects("my-bucket").await?;
/// ```
#[derive(Clone)]
pub struct ObjectStorageClient {
    buckets: Arc<dyn BucketOperations>,
    objects: Arc<dyn ObjectOperations>,
}

impl ObjectStorageClient {
    /// Bind a bucket and object implementation together.
    ///
    /// Both must talk to the same backend; [`StorageFactory`](crate::StorageFactory)
    /// is the usual way to get a matching pair.
    pub fn new(buckets: Arc<dyn BucketOperations>, objects: Arc<dyn ObjectOperations>) -> Self {
        debug_assert_eq!(buckets.storage_type(), objects.storage_type());
        Self { buckets, objects }
    }

    /// Get the active backend.
    pub fn storage_type(&self) -> StorageType {
        self.buckets.storage_type()
    }

    pub async fn create_bucket(&self, bucket: &str) -> Result<bool> {
        self.buckets.create(bucket).await
    }

    /// Delete a bucket, removing its objects first.
    pub async fn delete_bucket(&self, bucket: &str) -> Result<bool> {
        self.buckets.delete(bucket).await
    }

    pub async fn list_buckets(&self) -> Result<Vec<String>> {
        self.buckets.list_all().await
    }

    pub async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        self.buckets.exists(bucket).await
    }

    pub async fn put_object(&self, bucket: &str, key: &str, data: Bytes) -> Result<bool> {
        self.objects.upload(bucket, key, data).await
    }

    /// Read an object, `None` if it does not exist.
    pub async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Bytes>> {
        self.objects.download(bucket, key).await
    }

    pub async fn delete_object(&self, bucket: &str, key: &str) -> Result<bool> {
        self.objects.delete(bucket, key).await
    }

    pub async fn list_objects(&self, bucket: &str) -> Result<Vec<String>> {
        self.objects.list(bucket).await
    }
}

impl std::fmt::Debug for ObjectStorageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStorageClient")
            .field("storage_type", &self.storage_type())
            .finish_non_exhaustive()
    }
}
