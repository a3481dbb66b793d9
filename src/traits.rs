//! Storage operation traits.
//!
//! This module defines the two traits every backend implements. The facade
//! holds one implementation of each, both bound to the same backend.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::types::StorageType;

/// Bucket lifecycle operations.
///
/// Implementations validate names locally and wrap remote failures in
/// [`StorageError::BucketOperation`](crate::StorageError::BucketOperation).
#[async_trait]
pub trait BucketOperations: Send + Sync {
    /// Get the storage type this implementation talks to.
    fn storage_type(&self) -> StorageType;

    /// Create a bucket.
    ///
    /// Succeeds without a remote create when the bucket already exists.
    /// Returns `true` once the bucket exists.
    async fn create(&self, bucket: &str) -> Result<bool>;

    /// Delete a bucket and everything in it.
    ///
    /// A missing bucket is success. Objects are purged first on a best-effort
    /// basis; only the final bucket removal can fail the call.
    async fn delete(&self, bucket: &str) -> Result<bool>;

    /// List all buckets accessible with current credentials.
    async fn list_all(&self) -> Result<Vec<String>>;

    /// Check if a bucket exists.
    async fn exists(&self, bucket: &str) -> Result<bool>;
}

/// Object operations within a bucket.
///
/// Implementations validate bucket and key locally and wrap remote failures
/// in [`StorageError::ObjectOperation`](crate::StorageError::ObjectOperation).
#[async_trait]
pub trait ObjectOperations: Send + Sync {
    /// Get the storage type this implementation talks to.
    fn storage_type(&self) -> StorageType;

    /// Write an object in a single request. Empty payloads are allowed.
    async fn upload(&self, bucket: &str, key: &str, data: Bytes) -> Result<bool>;

    /// Read an object.
    ///
    /// Returns `Ok(None)` when the object does not exist.
    async fn download(&self, bucket: &str, key: &str) -> Result<Option<Bytes>>;

    /// Delete an object. Deleting a missing key succeeds.
    async fn delete(&self, bucket: &str, key: &str) -> Result<bool>;

    /// List every object key in the bucket.
    async fn list(&self, bucket: &str) -> Result<Vec<String>>;
}
