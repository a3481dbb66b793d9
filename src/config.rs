//! Loading a [`StorageConfig`] from JSON and the environment.
//!
//! The file supplies the full record; a handful of `OSK_*` environment
//! variables may then override connection details and secrets so that keys
//! do not have to live on disk.

use std::path::Path;

use crate::error::{Result, StorageError};
use crate::types::{StorageConfig, StorageType};

pub const ENV_STORAGE_TYPE: &str = "OSK_STORAGE_TYPE";
pub const ENV_ENDPOINT: &str = "OSK_ENDPOINT";
pub const ENV_REGION: &str = "OSK_REGION";
pub const ENV_ACCESS_KEY: &str = "OSK_ACCESS_KEY";
pub const ENV_SECRET_KEY: &str = "OSK_SECRET_KEY";
pub const ENV_SESSION_TOKEN: &str = "OSK_SESSION_TOKEN";
pub const ENV_DEFAULT_BUCKET: &str = "OSK_DEFAULT_BUCKET";

impl StorageConfig {
    /// Parse a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| StorageError::configuration(format!("failed to parse configuration: {}", e)))
    }

    /// Read a JSON configuration file and apply environment overrides.
    ///
    /// The result is validated before it is returned.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            StorageError::configuration(format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut config = Self::from_json_str(&raw)?;
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;

        tracing::debug!(path = %path.display(), storage_type = config.storage_type.as_str(), "Loaded storage configuration");
        Ok(config)
    }

    /// Apply `OSK_*` overrides using the given variable lookup.
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(kind) = get(ENV_STORAGE_TYPE) {
            self.storage_type = kind.parse::<StorageType>()?;
        }
        if let Some(endpoint) = get(ENV_ENDPOINT) {
            self.endpoint = Some(endpoint);
        }
        if let Some(region) = get(ENV_REGION) {
            self.region = region;
        }
        if let Some(access_key) = get(ENV_ACCESS_KEY) {
            self.access_key = Some(access_key);
        }
        if let Some(secret_key) = get(ENV_SECRET_KEY) {
            self.secret_key = Some(secret_key);
        }
        if let Some(token) = get(ENV_SESSION_TOKEN) {
            self.session_token = Some(token);
        }
        if let Some(bucket) = get(ENV_DEFAULT_BUCKET) {
            self.default_bucket = bucket;
        }
        Ok(())
    }
}
