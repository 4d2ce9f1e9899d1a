//! Prelude module - commonly used types for convenient import.
//!
//! Use `use conduit_telemetry::prelude::*;` to import all essential types.

// Errors
pub use crate::{DiagnosticEscalated, TelemetryError, TelemetryResult};

// Diagnostics
pub use crate::{Diagnostic, Diagnostics, ReportingMask, Severity};

// Logging configuration
pub use crate::{LogConfig, LogFormat, LogTarget};

// Setup functions
pub use crate::{setup_default_logging, setup_logging};
