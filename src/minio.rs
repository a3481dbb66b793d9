//! MinIO storage implementation.
//!
//! MinIO speaks the S3 API, so both bucket and object calls run through the
//! shared S3 operations on a client that always uses path-style addressing.
//! Object keys reach the server byte for byte, exactly as on S3.

use aws_sdk_s3::Client;

use crate::error::{Result, StorageError};
use crate::s3::{sdk_config, AddressingOptions, S3BucketOperations, S3ObjectOperations};
use crate::types::{StorageConfig, StorageType};

/// Builds the long-lived MinIO client from configuration.
pub struct MinioClientProvider;

impl MinioClientProvider {
    /// Create the client. No network I/O happens until the first call.
    pub fn build(config: &StorageConfig) -> Result<Client> {
        config.validate()?;
        if config.storage_type != StorageType::Minio {
            return Err(StorageError::configuration(format!(
                "MinIO client requested for {} configuration",
                config.storage_type.display_name()
            )));
        }

        let endpoint = config
            .endpoint()
            .ok_or_else(|| StorageError::configuration("MinIO endpoint is required"))?;
        if config.static_credentials().is_none() {
            return Err(StorageError::configuration("MinIO access key and secret key are required"));
        }

        if config.accelerate_mode_enabled || config.dual_stack_enabled {
            tracing::warn!("Transfer acceleration and dual-stack are S3-only settings, ignoring them for MinIO");
        }

        let sdk_config = sdk_config(
            config,
            AddressingOptions {
                path_style: true,
                accelerate: false,
                dual_stack: false,
            },
        )?;

        tracing::info!(endpoint, region = %config.region, "Initialized MinIO client");
        Ok(Client::from_conf(sdk_config))
    }
}

/// Bucket operations bound to a MinIO client.
pub fn bucket_operations(client: Client, region: impl Into<String>) -> S3BucketOperations {
    S3BucketOperations::new(client, region).for_backend(StorageType::Minio)
}

/// Object operations bound to a MinIO client.
pub fn object_operations(client: Client) -> S3ObjectOperations {
    S3ObjectOperations::new(client).for_backend(StorageType::Minio)
}
