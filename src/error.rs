//! Error taxonomy for storage operations.
//!
//! Every public operation either succeeds or returns exactly one
//! [`StorageError`]. Remote failures keep the SDK error as their `source`.
//! A missing object on download is not an error; it is reported as `Ok(None)`.

use thiserror::Error;

/// Boxed error carried as the cause of a wrapped remote failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the storage facade and its backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A blank bucket name or object key, rejected before any remote call.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Missing or malformed configuration, detected before a client is built.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A remote failure while creating, deleting, checking or listing buckets.
    #[error("{message}")]
    BucketOperation {
        message: String,
        #[source]
        source: BoxError,
    },

    /// A remote failure while uploading, downloading, deleting or listing objects.
    #[error("{message}")]
    ObjectOperation {
        message: String,
        #[source]
        source: BoxError,
    },
}

impl StorageError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        StorageError::InvalidArgument(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        StorageError::Configuration(message.into())
    }

    pub fn bucket(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        StorageError::BucketOperation {
            message: message.into(),
            source: source.into(),
        }
    }

    pub fn object(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        StorageError::ObjectOperation {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Short, stable name of the error kind, used in logs and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            StorageError::InvalidArgument(_) => "invalid_argument",
            StorageError::Configuration(_) => "configuration",
            StorageError::BucketOperation { .. } => "bucket_operation_failed",
            StorageError::ObjectOperation { .. } => "object_operation_failed",
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StorageError>;
