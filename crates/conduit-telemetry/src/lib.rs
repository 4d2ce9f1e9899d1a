//! Conduit Telemetry - logging and diagnostic escalation for conduit
//! components.
//!
//! This crate provides:
//! - Configurable logging setup with multiple formats
//! - A [`Diagnostics`] policy that turns recoverable diagnostics into hard
//!   failures, either raised explicitly or captured from `tracing` events
//!
//! # Example
//!
//! ```rust,no_run
//! use conduit_telemetry::{Diagnostics, LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let diagnostics = Diagnostics::install();
//! let config = LogConfig::new("debug")
//!     .with_format(LogFormat::Json)
//!     .with_directive("conduit_manifest=trace");
//!
//! setup_logging(&config, Some(&diagnostics))?;
//!
//! tracing::warn!("value coerced to string");
//! assert!(diagnostics.check().is_err());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod diagnostics;
mod error;
mod logging;

pub use diagnostics::{
    Diagnostic, DiagnosticEscalated, Diagnostics, ESCALATE_FIELD, EscalationLayer,
    ReportingMask, Severity,
};
pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    LOG_FORMAT_ENV, LOG_LEVEL_ENV, LogConfig, LogFormat, LogTarget, setup_default_logging,
    setup_logging,
};
