//! Runtime error types and exit codes.

use conduit_config::ConfigError;
use conduit_manifest::ManifestError;
use conduit_telemetry::{DiagnosticEscalated, TelemetryError};
use thiserror::Error;

/// Process exit code for a successful run.
pub const EXIT_SUCCESS: u8 = 0;
/// Process exit code for failures caused by the user's configuration or
/// input data.
pub const EXIT_USER_ERROR: u8 = 1;
/// Process exit code for everything else.
pub const EXIT_APPLICATION_ERROR: u8 = 2;

/// A failure caused by the user rather than by the component.
///
/// Return it (directly or wrapped in `anyhow` context) from
/// [`Component::run`](crate::Component::run) to exit with
/// [`EXIT_USER_ERROR`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct UserError(pub String);

impl UserError {
    /// Create a user error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors that abort an invocation.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A diagnostic was escalated.
    #[error(transparent)]
    Diagnostic(#[from] DiagnosticEscalated),

    /// `config.json` could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A manifest operation failed.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Logging could not be set up.
    #[error("failed to set up logging: {0}")]
    Telemetry(#[from] TelemetryError),

    /// The component's run step failed.
    #[error("{0:#}")]
    Component(anyhow::Error),
}

impl RuntimeError {
    /// The process exit code for this failure.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => EXIT_USER_ERROR,
            Self::Component(err) if is_user_error(err) => EXIT_USER_ERROR,
            Self::Diagnostic(_) | Self::Manifest(_) | Self::Telemetry(_) | Self::Component(_) => {
                EXIT_APPLICATION_ERROR
            },
        }
    }
}

fn is_user_error(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| cause.is::<UserError>() || cause.is::<ConfigError>())
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
