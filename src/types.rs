//! Storage types and configuration.
//!
//! This module defines the closed set of supported backends and the
//! configuration record handed to the factory at startup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::error::{Result, StorageError};

pub const DEFAULT_CONNECTION_TIMEOUT_MILLIS: u64 = 10_000;
pub const DEFAULT_SOCKET_TIMEOUT_MILLIS: u64 = 50_000;

/// Supported storage backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// Amazon S3 and S3-compatible cloud services
    S3,
    /// A self-hosted MinIO server
    Minio,
}

impl StorageType {
    /// Get the display name for this storage type.
    pub fn display_name(&self) -> &'static str {
        match self {
            StorageType::S3 => "Amazon S3",
            StorageType::Minio => "MinIO",
        }
    }

    /// Name used in configuration files and environment variables.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::S3 => "s3",
            StorageType::Minio => "minio",
        }
    }

    /// Get all available storage types.
    pub fn all() -> Vec<StorageType> {
        vec![StorageType::S3, StorageType::Minio]
    }

    /// Whether the backend can fall back to credentials from the environment.
    pub fn supports_ambient_credentials(&self) -> bool {
        match self {
            StorageType::S3 => true,
            StorageType::Minio => false,
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for StorageType {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        StorageType::all()
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let accepted: Vec<&str> = StorageType::all().iter().map(|t| t.as_str()).collect();
                StorageError::configuration(format!(
                    "unknown storage type '{}', expected one of: {}",
                    wanted,
                    accepted.join(", ")
                ))
            })
    }
}

/// Multipart thresholds.
///
/// Carried for configuration compatibility. Uploads are always a single put.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MultipartSettings {
    pub min_part_size: u64,
    pub copy_threshold: u64,
    pub copy_part_size: u64,
    pub minimum_upload_part_size: u64,
}

impl Default for MultipartSettings {
    fn default() -> Self {
        Self {
            min_part_size: 5 * 1024 * 1024,
            copy_threshold: 5 * 1024 * 1024 * 1024,
            copy_part_size: 100 * 1024 * 1024,
            minimum_upload_part_size: 5 * 1024 * 1024,
        }
    }
}

/// Configuration for the storage facade.
///
/// Read once at startup, validated, then handed to
/// [`StorageFactory`](crate::StorageFactory).
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    /// The backend to use.
    pub storage_type: StorageType,
    /// Service endpoint URL (leave unset for AWS, required for MinIO)
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Region (e.g., "us-east-1")
    pub region: String,
    /// Use path-style addressing
    #[serde(default)]
    pub path_style_access: bool,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Session token for temporary credentials
    #[serde(default)]
    pub session_token: Option<String>,
    /// Bucket created at bootstrap when `auto_create_bucket` is set
    pub default_bucket: String,
    #[serde(default)]
    pub auto_create_bucket: bool,
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_millis: u64,
    #[serde(default = "default_socket_timeout")]
    pub socket_timeout_millis: u64,
    /// S3 transfer acceleration endpoint (S3 only)
    #[serde(default)]
    pub accelerate_mode_enabled: bool,
    /// Dual-stack (IPv4 + IPv6) endpoint (S3 only)
    #[serde(default)]
    pub dual_stack_enabled: bool,
    #[serde(default)]
    pub user_agent_prefix: Option<String>,
    #[serde(default)]
    pub user_agent_suffix: Option<String>,
    #[serde(default)]
    pub multipart: MultipartSettings,
}

fn default_connection_timeout() -> u64 {
    DEFAULT_CONNECTION_TIMEOUT_MILLIS
}

fn default_socket_timeout() -> u64 {
    DEFAULT_SOCKET_TIMEOUT_MILLIS
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("StorageConfig")
            .field("storage_type", &self.storage_type)
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("path_style_access", &self.path_style_access)
            .field("access_key", &redacted(&self.access_key))
            .field("secret_key", &redacted(&self.secret_key))
            .field("session_token", &redacted(&self.session_token))
            .field("default_bucket", &self.default_bucket)
            .field("auto_create_bucket", &self.auto_create_bucket)
            .field("connection_timeout_millis", &self.connection_timeout_millis)
            .field("socket_timeout_millis", &self.socket_timeout_millis)
            .field("accelerate_mode_enabled", &self.accelerate_mode_enabled)
            .field("dual_stack_enabled", &self.dual_stack_enabled)
            .field("user_agent_prefix", &self.user_agent_prefix)
            .field("user_agent_suffix", &self.user_agent_suffix)
            .field("multipart", &self.multipart)
            .finish()
    }
}

/// Treat empty strings the same as unset values.
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl StorageConfig {
    /// Create a configuration with defaults for every optional field.
    pub fn new(storage_type: StorageType, region: impl Into<String>, default_bucket: impl Into<String>) -> Self {
        Self {
            storage_type,
            endpoint: None,
            region: region.into(),
            path_style_access: false,
            access_key: None,
            secret_key: None,
            session_token: None,
            default_bucket: default_bucket.into(),
            auto_create_bucket: false,
            connection_timeout_millis: DEFAULT_CONNECTION_TIMEOUT_MILLIS,
            socket_timeout_millis: DEFAULT_SOCKET_TIMEOUT_MILLIS,
            accelerate_mode_enabled: false,
            dual_stack_enabled: false,
            user_agent_prefix: None,
            user_agent_suffix: None,
            multipart: MultipartSettings::default(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_credentials(mut self, access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    /// Endpoint, if set and non-blank.
    pub fn endpoint(&self) -> Option<&str> {
        non_blank(&self.endpoint)
    }

    /// Access and secret key, if both are set.
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        match (non_blank(&self.access_key), non_blank(&self.secret_key)) {
            (Some(access), Some(secret)) => Some((access, secret)),
            _ => None,
        }
    }

    pub fn session_token(&self) -> Option<&str> {
        non_blank(&self.session_token)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_millis)
    }

    pub fn socket_timeout(&self) -> Duration {
        Duration::from_millis(self.socket_timeout_millis)
    }

    /// Upper bound for a whole call: the larger of the connect and socket timeouts.
    pub fn call_timeout(&self) -> Duration {
        self.connect_timeout().max(self.socket_timeout())
    }

    /// User agent token built from the optional prefix and suffix.
    pub fn user_agent(&self) -> Option<String> {
        let parts: Vec<&str> = [non_blank(&self.user_agent_prefix), non_blank(&self.user_agent_suffix)]
            .into_iter()
            .flatten()
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("-"))
        }
    }

    /// Validate the configuration for its storage type.
    pub fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            return Err(StorageError::configuration("region is required"));
        }
        if self.default_bucket.trim().is_empty() {
            return Err(StorageError::configuration("default bucket name is required"));
        }
        if self.connection_timeout_millis == 0 || self.socket_timeout_millis == 0 {
            return Err(StorageError::configuration("timeouts must be greater than zero"));
        }

        if let Some(endpoint) = self.endpoint() {
            let url = Url::parse(endpoint).map_err(|e| {
                StorageError::configuration(format!("invalid endpoint '{}': {}", endpoint, e))
            })?;
            if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
                return Err(StorageError::configuration(format!(
                    "endpoint '{}' must be an absolute http or https URL",
                    endpoint
                )));
            }
        }

        let has_access = non_blank(&self.access_key).is_some();
        let has_secret = non_blank(&self.secret_key).is_some();
        if has_access != has_secret {
            return Err(StorageError::configuration(
                "access key and secret key must be supplied together",
            ));
        }

        match self.storage_type {
            StorageType::S3 => Ok(()),
            StorageType::Minio => {
                if self.endpoint().is_none() {
                    return Err(StorageError::configuration("MinIO endpoint is required"));
                }
                if !has_access {
                    return Err(StorageError::configuration(
                        "MinIO access key and secret key are required",
                    ));
                }
                Ok(())
            }
        }
    }
}
