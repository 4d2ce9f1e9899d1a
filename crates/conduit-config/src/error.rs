//! Configuration error types.

use std::fmt;

use thiserror::Error;

/// The rule a configuration document broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationRule {
    /// A required key is absent.
    MissingRequired,
    /// A value has the wrong JSON type.
    TypeMismatch,
    /// A key is not declared by a strict object schema.
    UnknownKey,
    /// `null` was given for a field that does not accept it.
    NotNullable,
    /// The validated document does not fit the typed configuration shape.
    Shape,
    /// The file exceeds the size limit.
    FileSize,
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MissingRequired => "missing-required",
            Self::TypeMismatch => "type-mismatch",
            Self::UnknownKey => "unknown-key",
            Self::NotNullable => "not-nullable",
            Self::Shape => "shape",
            Self::FileSize => "file-size",
        };
        f.write_str(name)
    }
}

/// Errors produced while loading `config.json`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read (missing, permission denied, ...).
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path of the file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON.
    #[error("failed to decode config file {path}: {source}")]
    DecodeError {
        /// Path of the file.
        path: String,
        /// Underlying JSON error (carries line and column).
        #[source]
        source: serde_json::Error,
    },

    /// The document does not conform to the schema.
    #[error("invalid configuration at '{field}' ({rule}): {message}")]
    ValidationError {
        /// Dotted path of the offending field (`<root>` for the document).
        field: String,
        /// The violated rule.
        rule: ValidationRule,
        /// Human-readable detail.
        message: String,
    },
}

impl ConfigError {
    /// The violated rule, for validation errors.
    #[must_use]
    pub fn rule(&self) -> Option<ValidationRule> {
        match self {
            Self::ValidationError { rule, .. } => Some(*rule),
            _ => None,
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
