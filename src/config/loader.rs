//! Loading the provisioning configuration document.

use std::fs;
use std::path::Path;

use super::errors::{ConfigError, ConfigResult};
use super::types::ProvisioningConfig;

impl ProvisioningConfig {
    /// Parse a configuration document from a JSON string.
    pub fn from_json(document: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(document)?)
    }

    /// Load a configuration document from a file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let document = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&document)
    }
}
