//! S3 storage implementation using the AWS SDK.
//!
//! Bucket and object operations both go through one shared
//! [`aws_sdk_s3::Client`]. The MinIO backend reuses these operations on a
//! client built with path-style addressing forced on.

use async_trait::async_trait;
use aws_config::environment::EnvironmentVariableCredentialsProvider;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::{AppName, BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration, Delete, ObjectIdentifier};
use aws_sdk_s3::Client;
use bytes::Bytes;

use crate::error::{BoxError, Result, StorageError};
use crate::purge::{purge_bucket, ObjectPage, PurgeSource};
use crate::traits::{BucketOperations, ObjectOperations};
use crate::types::{StorageConfig, StorageType};
use crate::validation::{require_bucket, require_object};

/// Region where S3 rejects an explicit location constraint.
const DEFAULT_REGION: &str = "us-east-1";

/// Maximum number of keys in one multi-object delete request.
const MAX_DELETE_BATCH: usize = 1000;

const CREDENTIALS_PROVIDER_NAME: &str = "object-storage-kit";

/// Addressing options that differ between the S3 and MinIO clients.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AddressingOptions {
    pub path_style: bool,
    pub accelerate: bool,
    pub dual_stack: bool,
}

/// Build the SDK configuration shared by both backends.
///
/// Performs no I/O. SDK-level retries are disabled; requests that fail on a
/// stale pooled connection are still retried by the connector.
pub(crate) fn sdk_config(config: &StorageConfig, addressing: AddressingOptions) -> Result<aws_sdk_s3::Config> {
    let timeouts = TimeoutConfig::builder()
        .connect_timeout(config.connect_timeout())
        .read_timeout(config.socket_timeout())
        .operation_attempt_timeout(config.call_timeout())
        .operation_timeout(config.call_timeout())
        .build();

    let mut builder = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(config.region.trim().to_string()))
        .timeout_config(timeouts)
        .retry_config(RetryConfig::disabled())
        .force_path_style(addressing.path_style)
        .accelerate(addressing.accelerate)
        .use_dual_stack(addressing.dual_stack);

    if let Some(endpoint) = config.endpoint() {
        builder = builder.endpoint_url(endpoint);
    }

    builder = match config.static_credentials() {
        Some((access_key, secret_key)) => builder.credentials_provider(Credentials::new(
            access_key,
            secret_key,
            config.session_token().map(str::to_string),
            None,
            CREDENTIALS_PROVIDER_NAME,
        )),
        None if config.storage_type.supports_ambient_credentials() => {
            tracing::debug!("No static credentials configured, reading them from the environment");
            builder.credentials_provider(EnvironmentVariableCredentialsProvider::new())
        }
        None => {
            return Err(StorageError::configuration(format!(
                "{} requires an access key and secret key",
                config.storage_type.display_name()
            )));
        }
    };

    if let Some(user_agent) = config.user_agent() {
        let app_name = AppName::new(user_agent.clone()).map_err(|e| {
            StorageError::configuration(format!("invalid user agent '{}': {}", user_agent, e))
        })?;
        builder = builder.app_name(app_name);
    }

    Ok(builder.build())
}

/// Builds the long-lived S3 client from configuration.
pub struct S3ClientProvider;

impl S3ClientProvider {
    /// Create the client. No network I/O happens until the first call.
    pub fn build(config: &StorageConfig) -> Result<Client> {
        config.validate()?;
        if config.storage_type != StorageType::S3 {
            return Err(StorageError::configuration(format!(
                "S3 client requested for {} configuration",
                config.storage_type.display_name()
            )));
        }

        let sdk_config = sdk_config(
            config,
            AddressingOptions {
                path_style: config.path_style_access,
                accelerate: config.accelerate_mode_enabled,
                dual_stack: config.dual_stack_enabled,
            },
        )?;

        tracing::info!(
            region = %config.region,
            endpoint = config.endpoint().unwrap_or("<aws>"),
            path_style = config.path_style_access,
            "Initialized S3 client"
        );
        Ok(Client::from_conf(sdk_config))
    }
}

fn bucket_failure<E>(message: String, bucket: &str, err: E) -> StorageError
where
    E: std::error::Error + Send + Sync + 'static,
{
    tracing::error!(bucket, error = %DisplayErrorContext(&err), "{}", message);
    StorageError::bucket(message, err)
}

fn object_failure<E>(message: String, bucket: &str, key: &str, err: E) -> StorageError
where
    E: std::error::Error + Send + Sync + 'static,
{
    tracing::error!(bucket, key, error = %DisplayErrorContext(&err), "{}", message);
    StorageError::object(message, err)
}

fn bucket_scoped_object_failure<E>(message: String, bucket: &str, err: E) -> StorageError
where
    E: std::error::Error + Send + Sync + 'static,
{
    tracing::error!(bucket, error = %DisplayErrorContext(&err), "{}", message);
    StorageError::object(message, err)
}

/// Bucket operations against S3, shared by the S3 and MinIO backends.
#[derive(Clone)]
pub struct S3BucketOperations {
    client: Client,
    region: String,
    storage_type: StorageType,
}

impl S3BucketOperations {
    pub fn new(client: Client, region: impl Into<String>) -> Self {
        Self {
            client,
            region: region.into(),
            storage_type: StorageType::S3,
        }
    }

    /// Report a different backend in logs and `storage_type()`.
    pub(crate) fn for_backend(mut self, storage_type: StorageType) -> Self {
        self.storage_type = storage_type;
        self
    }

    /// Issue the bare remove-bucket request. The bucket must already be empty.
    async fn remove_bucket(&self, bucket: &str) -> Result<()> {
        self.client
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|err| bucket_failure(format!("Failed to delete bucket: {}", bucket), bucket, err))?;
        Ok(())
    }

    fn location_constraint(&self) -> Option<CreateBucketConfiguration> {
        let region = self.region.trim();
        if region.is_empty() || region == DEFAULT_REGION {
            return None;
        }
        Some(
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(region))
                .build(),
        )
    }
}

#[async_trait]
impl BucketOperations for S3BucketOperations {
    fn storage_type(&self) -> StorageType {
        self.storage_type
    }

    async fn create(&self, bucket: &str) -> Result<bool> {
        require_bucket(bucket)?;

        if self.exists(bucket).await? {
            tracing::info!(bucket, backend = self.storage_type.as_str(), "Bucket already exists");
            return Ok(true);
        }

        tracing::info!(bucket, backend = self.storage_type.as_str(), "Creating bucket");
        let request = self
            .client
            .create_bucket()
            .bucket(bucket)
            .set_create_bucket_configuration(self.location_constraint());

        match request.send().await {
            Ok(_) => {
                tracing::info!(bucket, "Successfully created bucket");
                Ok(true)
            }
            Err(err) if matches!(err.as_service_error(), Some(e) if e.is_bucket_already_owned_by_you()) => {
                tracing::info!(bucket, "Bucket was created concurrently");
                Ok(true)
            }
            Err(err) => Err(bucket_failure(format!("Failed to create bucket: {}", bucket), bucket, err)),
        }
    }

    async fn delete(&self, bucket: &str) -> Result<bool> {
        require_bucket(bucket)?;

        if !self.exists(bucket).await? {
            tracing::info!(bucket, "Bucket does not exist, nothing to delete");
            return Ok(true);
        }

        tracing::info!(bucket, backend = self.storage_type.as_str(), "Deleting bucket");
        let report = purge_bucket(self, bucket).await;
        tracing::debug!(bucket, deleted = report.deleted, failed = report.failed, "Purged bucket");

        self.remove_bucket(bucket).await?;
        tracing::info!(bucket, "Successfully deleted bucket");
        Ok(true)
    }

    async fn list_all(&self) -> Result<Vec<String>> {
        tracing::debug!(backend = self.storage_type.as_str(), "Listing all buckets");

        let mut names = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let output = self
                .client
                .list_buckets()
                .set_continuation_token(token.take())
                .send()
                .await
                .map_err(|err| {
                    tracing::error!(error = %DisplayErrorContext(&err), "Failed to list buckets");
                    StorageError::bucket("Failed to list buckets", err)
                })?;

            names.extend(output.buckets().iter().filter_map(|b| b.name().map(str::to_string)));

            match output.continuation_token() {
                Some(next) if !next.is_empty() => token = Some(next.to_string()),
                _ => break,
            }
        }

        tracing::debug!(count = names.len(), "Found buckets");
        Ok(names)
    }

    async fn exists(&self, bucket: &str) -> Result<bool> {
        require_bucket(bucket)?;

        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(err) if matches!(err.as_service_error(), Some(e) if e.is_not_found()) => Ok(false),
            Err(err) => Err(bucket_failure(
                format!("Failed to check bucket: {}", bucket),
                bucket,
                err,
            )),
        }
    }
}

#[async_trait]
impl PurgeSource for S3BucketOperations {
    fn max_batch(&self) -> usize {
        MAX_DELETE_BATCH
    }

    async fn list_page(&self, bucket: &str, token: Option<String>) -> std::result::Result<ObjectPage, BoxError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .set_continuation_token(token)
            .send()
            .await?;

        Ok(ObjectPage {
            keys: output
                .contents()
                .iter()
                .filter_map(|o| o.key().map(str::to_string))
                .collect(),
            next_token: output.next_continuation_token().map(str::to_string),
        })
    }

    async fn delete_batch(&self, bucket: &str, keys: &[String]) -> std::result::Result<Vec<String>, BoxError> {
        let identifiers = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let delete = Delete::builder().set_objects(Some(identifiers)).quiet(true).build()?;

        let output = self
            .client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await?;

        Ok(output
            .errors()
            .iter()
            .filter_map(|e| e.key().map(str::to_string))
            .collect())
    }
}

/// Object operations against S3, shared by the S3 and MinIO backends.
///
/// Keys are sent exactly as given; no path normalization happens locally.
#[derive(Clone)]
pub struct S3ObjectOperations {
    client: Client,
    storage_type: StorageType,
}

impl S3ObjectOperations {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            storage_type: StorageType::S3,
        }
    }

    /// Report a different backend in logs and `storage_type()`.
    pub(crate) fn for_backend(mut self, storage_type: StorageType) -> Self {
        self.storage_type = storage_type;
        self
    }
}

#[async_trait]
impl ObjectOperations for S3ObjectOperations {
    fn storage_type(&self) -> StorageType {
        self.storage_type
    }

    async fn upload(&self, bucket: &str, key: &str, data: Bytes) -> Result<bool> {
        require_object(bucket, key)?;

        let size = data.len();
        tracing::info!(bucket, key, size, backend = self.storage_type.as_str(), "Uploading object");

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|err| object_failure(format!("Failed to upload object: {}", key), bucket, key, err))?;

        tracing::info!(bucket, key, "Successfully uploaded object");
        Ok(true)
    }

    async fn download(&self, bucket: &str, key: &str) -> Result<Option<Bytes>> {
        require_object(bucket, key)?;

        tracing::info!(bucket, key, backend = self.storage_type.as_str(), "Downloading object");
        let output = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(output) => output,
            Err(err) if matches!(err.as_service_error(), Some(e) if e.is_no_such_key()) => {
                tracing::warn!(bucket, key, "Object not found");
                return Ok(None);
            }
            Err(err) => {
                return Err(object_failure(format!("Failed to download object: {}", key), bucket, key, err));
            }
        };

        let data = output
            .body
            .collect()
            .await
            .map_err(|err| object_failure(format!("Failed to read object data: {}", key), bucket, key, err))?
            .into_bytes();

        tracing::info!(bucket, key, size = data.len(), "Successfully downloaded object");
        Ok(Some(data))
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<bool> {
        require_object(bucket, key)?;

        tracing::info!(bucket, key, backend = self.storage_type.as_str(), "Deleting object");
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| object_failure(format!("Failed to delete object: {}", key), bucket, key, err))?;

        tracing::info!(bucket, key, "Successfully deleted object");
        Ok(true)
    }

    async fn list(&self, bucket: &str) -> Result<Vec<String>> {
        require_bucket(bucket)?;

        tracing::debug!(bucket, backend = self.storage_type.as_str(), "Listing objects");
        let mut keys = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .set_continuation_token(token.take())
                .send()
                .await
                .map_err(|err| {
                    bucket_scoped_object_failure(format!("Failed to list objects in bucket: {}", bucket), bucket, err)
                })?;

            keys.extend(output.contents().iter().filter_map(|o| o.key().map(str::to_string)));

            match output.next_continuation_token() {
                Some(next) => token = Some(next.to_string()),
                None => break,
            }
        }

        tracing::debug!(bucket, count = keys.len(), "Listed objects");
        Ok(keys)
    }
}
