//! Reading `config.json` from the data directory.
//!
//! The pipeline is read → decode → validate → type. Each stage has its own
//! error variant so the caller can tell a missing file from a typo in a
//! parameter name.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult, ValidationRule};
use crate::schema::ConfigDefinition;
use crate::types::Config;
use crate::validate;

/// Name of the configuration file inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Maximum allowed config file size (16 MiB).
const MAX_CONFIG_FILE_SIZE: u64 = 16_777_216;

/// Load `config.json` from `data_dir`.
///
/// # Errors
///
/// See [`load_file`].
pub fn load<P: DeserializeOwned>(
    data_dir: &Path,
    definition: &dyn ConfigDefinition,
) -> ConfigResult<Config<P>> {
    load_file(&data_dir.join(CONFIG_FILE_NAME), definition)
}

/// Load a configuration from an explicit file.
///
/// # Errors
///
/// - [`ConfigError::ReadError`] if the file cannot be read
/// - [`ConfigError::DecodeError`] if it is not valid JSON
/// - [`ConfigError::ValidationError`] if it is too large, violates the
///   schema, or does not fit the parameters type `P`
pub fn load_file<P: DeserializeOwned>(
    path: &Path,
    definition: &dyn ConfigDefinition,
) -> ConfigResult<Config<P>> {
    let bytes = std::fs::read(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    // Check size after reading to avoid TOCTOU between stat and read.
    if bytes.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            rule: ValidationRule::FileSize,
            message: format!(
                "config file is {} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit",
                bytes.len()
            ),
        });
    }

    let document: Value = serde_json::from_slice(&bytes).map_err(|e| ConfigError::DecodeError {
        path: path.display().to_string(),
        source: e,
    })?;

    let config = load_value(document, definition)?;
    debug!(path = %path.display(), action = config.action(), "loaded configuration");
    Ok(config)
}

/// Validate an already decoded document.
///
/// # Errors
///
/// Returns [`ConfigError::ValidationError`] if the document violates the
/// schema or does not fit `P`.
pub fn load_value<P: DeserializeOwned>(
    document: Value,
    definition: &dyn ConfigDefinition,
) -> ConfigResult<Config<P>> {
    let validated = validate::validate(&definition.root_schema(), document)?;
    Config::from_validated(validated)
}
