#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Configuration loading for conduit components.
//!
//! Every component invocation starts from `config.json` in the data
//! directory. This crate reads it, validates it against a declarative
//! schema and hands back an immutable, typed [`Config`].
//!
//! # Usage
//!
//! ```rust,no_run
//! use conduit_config::{Config, ConfigDefinition, Field, ObjectSchema, SchemaNode};
//! use serde::Deserialize;
//!
//! struct Orders;
//!
//! impl ConfigDefinition for Orders {
//!     fn parameters_schema(&self) -> ObjectSchema {
//!         ObjectSchema::new().field("table", Field::required(SchemaNode::String))
//!     }
//! }
//!
//! #[derive(Deserialize)]
//! struct OrdersParams {
//!     table: String,
//! }
//!
//! let config = Config::<OrdersParams>::load(std::path::Path::new("/data/"), &Orders).unwrap();
//! println!("exporting {}", config.parameters().table);
//! ```
//!
//! # Design
//!
//! This crate has **no dependencies on other internal conduit crates**. It
//! only depends on `serde`, `serde_json`, `thiserror` and `tracing`.

/// Configuration error types.
pub mod error;
/// `config.json` discovery and loading.
pub mod loader;
/// Declarative schema definitions.
pub mod schema;
/// The validated configuration type.
pub mod types;
/// Schema validation.
pub mod validate;

use std::path::Path;

use serde::de::DeserializeOwned;

// Re-export primary types at the crate root.
pub use error::{ConfigError, ConfigResult, ValidationRule};
pub use loader::{CONFIG_FILE_NAME, load, load_file, load_value};
pub use schema::{
    BaseDefinition, ConfigDefinition, DEFAULT_ACTION, Field, ObjectSchema, SchemaNode,
    base_root_schema,
};
pub use types::Config;

impl<P: DeserializeOwned> Config<P> {
    /// Load `config.json` from the data directory.
    ///
    /// See [`loader::load`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, decoded, or
    /// fails validation.
    pub fn load(data_dir: &Path, definition: &dyn ConfigDefinition) -> ConfigResult<Self> {
        loader::load(data_dir, definition)
    }

    /// Load a configuration from a single explicit file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, decoded, or
    /// fails validation.
    pub fn load_file(path: &Path, definition: &dyn ConfigDefinition) -> ConfigResult<Self> {
        loader::load_file(path, definition)
    }
}
