//! Prelude module - commonly used types for convenient import.
//!
//! Use `use conduit_runtime::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust,no_run
//! use conduit_runtime::prelude::*;
//!
//! struct Hello;
//!
//! impl Component for Hello {
//!     type Parameters = serde_json::Map<String, serde_json::Value>;
//!
//!     fn run(&mut self, app: &Application<Self::Parameters>) -> anyhow::Result<()> {
//!         tracing::info!(data_dir = %app.data_dir(), "hello");
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> std::process::ExitCode {
//!     run_component(Hello)
//! }
//! ```

// Shell
pub use crate::{Application, Component, DataDir, run_component};

// Errors
pub use crate::{RuntimeError, RuntimeResult, UserError};

// Collaborators components work with
pub use conduit_config::{Config, ConfigDefinition, Field, ObjectSchema, SchemaNode};
pub use conduit_manifest::{FileManifest, ManifestManager, TableManifest};
pub use conduit_telemetry::{Diagnostics, Severity, diagnostic};
