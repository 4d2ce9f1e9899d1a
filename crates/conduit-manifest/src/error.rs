//! Manifest error types.

use thiserror::Error;

/// A manifest entry that breaks one of its invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvalidManifest(pub String);

/// Why a manifest write failed.
#[derive(Debug, Error)]
pub enum WriteFailure {
    /// The entry was rejected before anything was written.
    #[error("invalid manifest: {0}")]
    Invalid(#[from] InvalidManifest),

    /// Serialization failed.
    #[error("failed to encode manifest: {0}")]
    Encode(#[source] serde_json::Error),

    /// The filesystem refused the write (disk full, permission denied, ...).
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Errors from manifest operations.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Writing the manifest failed; nothing was committed.
    #[error("failed to write manifest {path}: {reason}")]
    WriteError {
        /// Path of the manifest file.
        path: String,
        /// What went wrong.
        #[source]
        reason: WriteFailure,
    },

    /// No manifest exists for the artifact.
    #[error("manifest not found: {path}")]
    NotFound {
        /// Path of the expected manifest file.
        path: String,
    },

    /// The manifest exists but could not be read.
    #[error("failed to read manifest {path}: {source}")]
    ReadError {
        /// Path of the manifest file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid JSON or does not have the manifest shape.
    #[error("failed to decode manifest {path}: {source}")]
    DecodeError {
        /// Path of the manifest file.
        path: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ManifestError::WriteError {
            path: "/data/out/tables/orders.csv.manifest".to_owned(),
            reason: WriteFailure::Invalid(InvalidManifest(
                "primary key column 'missing' is not in columns".to_owned(),
            )),
        };
        assert_eq!(
            err.to_string(),
            "failed to write manifest /data/out/tables/orders.csv.manifest: invalid manifest: primary key column 'missing' is not in columns"
        );

        let err = ManifestError::NotFound {
            path: "/data/in/tables/a.csv.manifest".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "manifest not found: /data/in/tables/a.csv.manifest"
        );
    }
}
