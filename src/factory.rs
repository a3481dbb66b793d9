//! Storage client factory.
//!
//! The factory is the only place that maps a [`StorageType`] to a concrete
//! backend. Everything past this point sees the backend only through the
//! [`ObjectStorageClient`] facade.

use std::sync::Arc;

use crate::error::Result;
use crate::facade::ObjectStorageClient;
use crate::minio::{self, MinioClientProvider};
use crate::s3::{S3BucketOperations, S3ClientProvider, S3ObjectOperations};
use crate::types::{StorageConfig, StorageType};

/// Factory for creating storage clients based on configuration.
///
/// # Example
///
/// ```ignore
/// use object_storage_kit::{StorageConfig, StorageFactory, StorageType};
///
/// let config = StorageConfig::new(StorageType::Minio, "us-east-1", "uploads")
///     .with_endpoint("http://localhost:9000")
///     .with_credentials("minioadmin", "minioadmin");
///
/// let client = StorageFactory::bootstrap(&config).await?;
/// ```
pub struct StorageFactory;

impl StorageFactory {
    /// Create a storage client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Configuration`](crate::StorageError::Configuration)
    /// if the configuration is invalid for its storage type.
    pub fn create(config: &StorageConfig) -> Result<ObjectStorageClient> {
        config.validate()?;

        let client = match config.storage_type {
            StorageType::S3 => {
                let client = S3ClientProvider::build(config)?;
                ObjectStorageClient::new(
                    Arc::new(S3BucketOperations::new(client.clone(), config.region.trim())),
                    Arc::new(S3ObjectOperations::new(client)),
                )
            }
            StorageType::Minio => {
                let client = MinioClientProvider::build(config)?;
                ObjectStorageClient::new(
                    Arc::new(minio::bucket_operations(client.clone(), config.region.trim())),
                    Arc::new(minio::object_operations(client)),
                )
            }
        };

        tracing::info!(backend = config.storage_type.as_str(), "Storage client ready");
        Ok(client)
    }

    /// Create a storage client and, when `autoCreateBucket` is set, make sure
    /// the default bucket exists.
    pub async fn bootstrap(config: &StorageConfig) -> Result<ObjectStorageClient> {
        let client = Self::create(config)?;

        if config.auto_create_bucket {
            tracing::info!(bucket = %config.default_bucket, "Ensuring default bucket exists");
            client.create_bucket(config.default_bucket.trim()).await?;
        }

        Ok(client)
    }

    /// Check if a storage type has a backend implementation.
    pub fn is_supported(storage_type: StorageType) -> bool {
        match storage_type {
            StorageType::S3 | StorageType::Minio => true,
        }
    }

    /// Get a list of all supported storage types.
    pub fn supported_types() -> Vec<StorageType> {
        StorageType::all()
            .into_iter()
            .filter(|t| Self::is_supported(*t))
            .collect()
    }
}
