#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Conduit Runtime - the application shell for data-pipeline components.
//!
//! A component is one process invocation inside a container. The platform
//! mounts a data directory, writes `config.json` into it and expects the
//! component to leave its output artifacts, each with a manifest, under
//! `out/`. This crate does everything around the component's own logic:
//!
//! - resolves the data directory from `KBC_DATADIR`
//! - loads and validates `config.json`
//! - binds a [`ManifestManager`](conduit_manifest::ManifestManager) to the
//!   data directory
//! - escalates warnings into failures
//! - maps the outcome to the platform's exit codes
//!
//! Implement [`Component`] and hand it to [`run_component`] from `main`.

pub mod prelude;

mod application;
mod component;
mod data_dir;
mod error;
mod runner;

pub use application::Application;
pub use component::Component;
pub use data_dir::{DATA_DIR_ENV, DEFAULT_DATA_DIR, DataDir, resolve_data_dir};
pub use error::{
    EXIT_APPLICATION_ERROR, EXIT_SUCCESS, EXIT_USER_ERROR, RuntimeError, RuntimeResult, UserError,
};
pub use runner::{execute, run_component};
