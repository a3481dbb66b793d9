//! Argument checks shared by every backend.

use crate::error::{Result, StorageError};

/// Reject blank bucket names before any remote call.
pub fn require_bucket(bucket: &str) -> Result<()> {
    if bucket.trim().is_empty() {
        tracing::warn!("Rejected blank bucket name");
        return Err(StorageError::invalid_argument("Bucket name cannot be blank"));
    }
    Ok(())
}

/// Reject a blank bucket name or object key.
pub fn require_object(bucket: &str, key: &str) -> Result<()> {
    require_bucket(bucket)?;
    if key.trim().is_empty() {
        tracing::warn!(bucket, "Rejected blank object key");
        return Err(StorageError::invalid_argument("Object key cannot be blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_bucket() {
        assert!(require_bucket("photos").is_ok());
        assert!(matches!(require_bucket(""), Err(StorageError::InvalidArgument(_))));
        assert!(matches!(require_bucket(" \t"), Err(StorageError::InvalidArgument(_))));
    }

    #[test]
    fn test_require_object() {
        assert!(require_object("photos", "2024/a.jpg").is_ok());
        assert!(require_object("", "a.jpg").is_err());

        let err = require_object("photos", "  ").unwrap_err();
        assert_eq!(err.to_string(), "invalid argument: Object key cannot be blank");
    }
}
