//! In-memory backend used by unit tests.
//!
//! Behaves like a remote service: buckets must exist before objects are
//! written, non-empty buckets cannot be removed, and every simulated request
//! is counted so tests can assert that validation happened first.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{BoxError, Result, StorageError};
use crate::facade::ObjectStorageClient;
use crate::purge::{purge_bucket, ObjectPage, PurgeReport, PurgeSource};
use crate::traits::{BucketOperations, ObjectOperations};
use crate::types::StorageType;
use crate::validation::{require_bucket, require_object};

/// Keys returned per listing page.
const PAGE_SIZE: usize = 2;

type Buckets = BTreeMap<String, BTreeMap<String, Bytes>>;

pub(crate) struct MemoryBackend {
    storage_type: StorageType,
    buckets: Mutex<Buckets>,
    failing_keys: Mutex<HashSet<String>>,
    outage: AtomicBool,
    remote_calls: AtomicUsize,
    create_calls: AtomicUsize,
    last_purge: Mutex<PurgeReport>,
}

impl MemoryBackend {
    pub fn new(storage_type: StorageType) -> Self {
        Self {
            storage_type,
            buckets: Mutex::new(BTreeMap::new()),
            failing_keys: Mutex::new(HashSet::new()),
            outage: AtomicBool::new(false),
            remote_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            last_purge: Mutex::new(PurgeReport::default()),
        }
    }

    /// A facade bound to this backend for both bucket and object calls.
    pub fn client(self: &Arc<Self>) -> ObjectStorageClient {
        ObjectStorageClient::new(self.clone(), self.clone())
    }

    /// Make every later delete of `key` fail.
    pub fn fail_deletes_of(&self, key: &str) {
        self.failing_keys.lock().unwrap().insert(key.to_string());
    }

    /// Make every simulated request fail until switched off.
    pub fn fail_remote_calls(&self, fail: bool) {
        self.outage.store(fail, Ordering::SeqCst);
    }

    pub fn remote_calls(&self) -> usize {
        self.remote_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn object_count(&self) -> usize {
        self.buckets.lock().unwrap().values().map(BTreeMap::len).sum()
    }

    pub fn last_purge(&self) -> PurgeReport {
        *self.last_purge.lock().unwrap()
    }

    fn request(&self) -> io::Result<()> {
        self.remote_calls.fetch_add(1, Ordering::SeqCst);
        if self.outage.load(Ordering::SeqCst) {
            return Err(io::Error::other("service unavailable"));
        }
        Ok(())
    }

    fn no_such_bucket(bucket: &str) -> io::Error {
        io::Error::new(io::ErrorKind::NotFound, format!("no such bucket: {}", bucket))
    }
}

#[async_trait]
impl BucketOperations for MemoryBackend {
    fn storage_type(&self) -> StorageType {
        self.storage_type
    }

    async fn create(&self, bucket: &str) -> Result<bool> {
        if BucketOperations::exists(self, bucket).await? {
            return Ok(true);
        }

        self.request()
            .map_err(|e| StorageError::bucket(format!("Failed to create bucket: {}", bucket), e))?;
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.buckets.lock().unwrap().entry(bucket.to_string()).or_default();
        Ok(true)
    }

    async fn delete(&self, bucket: &str) -> Result<bool> {
        if !BucketOperations::exists(self, bucket).await? {
            return Ok(true);
        }

        let report = purge_bucket(self, bucket).await;
        *self.last_purge.lock().unwrap() = report;

        let message = format!("Failed to delete bucket: {}", bucket);
        self.request().map_err(|e| StorageError::bucket(message.clone(), e))?;

        let mut buckets = self.buckets.lock().unwrap();
        if buckets.get(bucket).is_some_and(|objects| !objects.is_empty()) {
            return Err(StorageError::bucket(
                message,
                io::Error::other("the bucket you tried to delete is not empty"),
            ));
        }
        buckets.remove(bucket);
        Ok(true)
    }

    async fn list_all(&self) -> Result<Vec<String>> {
        self.request()
            .map_err(|e| StorageError::bucket("Failed to list buckets", e))?;
        Ok(self.buckets.lock().unwrap().keys().cloned().collect())
    }

    async fn exists(&self, bucket: &str) -> Result<bool> {
        require_bucket(bucket)?;
        self.request()
            .map_err(|e| StorageError::bucket(format!("Failed to check bucket: {}", bucket), e))?;
        Ok(self.buckets.lock().unwrap().contains_key(bucket))
    }
}

#[async_trait]
impl PurgeSource for MemoryBackend {
    fn max_batch(&self) -> usize {
        PAGE_SIZE
    }

    async fn list_page(&self, bucket: &str, token: Option<String>) -> std::result::Result<ObjectPage, BoxError> {
        self.request()?;
        let start: usize = match token {
            Some(token) => token.parse()?,
            None => 0,
        };

        let buckets = self.buckets.lock().unwrap();
        let objects = buckets.get(bucket).ok_or_else(|| Self::no_such_bucket(bucket))?;
        let keys: Vec<String> = objects.keys().skip(start).take(PAGE_SIZE).cloned().collect();
        let next = start + keys.len();
        let next_token = (next < objects.len()).then(|| next.to_string());
        Ok(ObjectPage { keys, next_token })
    }

    async fn delete_batch(&self, bucket: &str, keys: &[String]) -> std::result::Result<Vec<String>, BoxError> {
        self.request()?;
        let failing = self.failing_keys.lock().unwrap();
        let mut buckets = self.buckets.lock().unwrap();
        let objects = buckets.get_mut(bucket).ok_or_else(|| Self::no_such_bucket(bucket))?;

        let mut failed = Vec::new();
        for key in keys {
            if failing.contains(key) {
                failed.push(key.clone());
            } else {
                objects.remove(key);
            }
        }
        Ok(failed)
    }
}

#[async_trait]
impl ObjectOperations for MemoryBackend {
    fn storage_type(&self) -> StorageType {
        self.storage_type
    }

    async fn upload(&self, bucket: &str, key: &str, data: Bytes) -> Result<bool> {
        require_object(bucket, key)?;
        let message = format!("Failed to upload object: {}", key);
        self.request().map_err(|e| StorageError::object(message.clone(), e))?;

        let mut buckets = self.buckets.lock().unwrap();
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| StorageError::object(message, Self::no_such_bucket(bucket)))?;
        objects.insert(key.to_string(), data);
        Ok(true)
    }

    async fn download(&self, bucket: &str, key: &str) -> Result<Option<Bytes>> {
        require_object(bucket, key)?;
        self.request()
            .map_err(|e| StorageError::object(format!("Failed to download object: {}", key), e))?;

        let buckets = self.buckets.lock().unwrap();
        Ok(buckets.get(bucket).and_then(|objects| objects.get(key).cloned()))
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<bool> {
        require_object(bucket, key)?;
        let message = format!("Failed to delete object: {}", key);
        self.request().map_err(|e| StorageError::object(message.clone(), e))?;

        if self.failing_keys.lock().unwrap().contains(key) {
            return Err(StorageError::object(message, io::Error::other("access denied")));
        }
        if let Some(objects) = self.buckets.lock().unwrap().get_mut(bucket) {
            objects.remove(key);
        }
        Ok(true)
    }

    async fn list(&self, bucket: &str) -> Result<Vec<String>> {
        require_bucket(bucket)?;
        let message = format!("Failed to list objects in bucket: {}", bucket);
        self.request().map_err(|e| StorageError::object(message.clone(), e))?;

        let buckets = self.buckets.lock().unwrap();
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| StorageError::object(message, Self::no_such_bucket(bucket)))?;
        Ok(objects.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_purge_pages_through_every_key() {
        let backend = Arc::new(MemoryBackend::new(StorageType::S3));
        let client = backend.client();
        client.create_bucket("b").await.unwrap();
        for key in ["1", "2", "3", "4", "5"] {
            client.put_object("b", key, Bytes::from_static(b"x")).await.unwrap();
        }

        let report = purge_bucket(backend.as_ref(), "b").await;
        assert_eq!(report, PurgeReport { deleted: 5, failed: 0 });
        assert_eq!(backend.object_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_to_missing_bucket_fails() {
        let backend = Arc::new(MemoryBackend::new(StorageType::S3));
        let err = backend
            .client()
            .put_object("missing", "k", Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::ObjectOperation { .. }));
    }
}
