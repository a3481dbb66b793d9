//! Object storage behind one facade.
//!
//! This crate puts S3 and MinIO object storage behind a single
//! [`ObjectStorageClient`]. The backend is picked once, from configuration,
//! by [`StorageFactory`]; callers never see which one is active.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                  ObjectStorageClient                   │
//! └───────────────┬────────────────────────┬───────────────┘
//!                 │                        │
//!        dyn BucketOperations     dyn ObjectOperations
//!                 │                        │
//!      ┌──────────┴─────────┐   ┌──────────┴─────────┐
//!      │ S3BucketOperations │   │ S3ObjectOperations │
//!      └──────────┬─────────┘   └──────────┬─────────┘
//!                 └───────────┬────────────┘
//!                     aws_sdk_s3::Client
//!            (path-style always on for MinIO)
//! ```
//!
//! # Supported Storage Types
//!
//! - **S3**: Amazon S3 and S3-compatible services, with static or
//!   environment credentials
//! - **MinIO**: self-hosted MinIO servers, path-style addressing only
//!
//! # Example
//!
//! ```ignore
//! use object_storage_kit::{StorageConfig, StorageFactory};
//!
//! let config = StorageConfig::from_file("storage.json").await?;
//! let client = StorageFactory::bootstrap(&config).await?;
//!
//! client.put_object(&config.default_bucket, "hello.txt", "hello".into()).await?;
//! ```

pub mod config;
pub mod error;
pub mod facade;
pub mod factory;
pub mod minio;
pub mod purge;
pub mod s3;
pub mod traits;
pub mod types;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Result, StorageError};
pub use facade::ObjectStorageClient;
pub use factory::StorageFactory;
pub use purge::PurgeReport;
pub use traits::{BucketOperations, ObjectOperations};
pub use types::{MultipartSettings, StorageConfig, StorageType};
