#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Manifest sidecars for conduit components.
//!
//! Every artifact a component hands to the platform is accompanied by a
//! JSON document named `<artifact>.manifest` describing its structure:
//! destination table, columns, primary key and load mode. The platform
//! reads the manifest instead of inferring the structure from the data.
//!
//! # Usage
//!
//! ```rust,no_run
//! use conduit_manifest::{ManifestManager, TableManifest};
//!
//! # fn main() -> conduit_manifest::ManifestResult<()> {
//! let manager = ManifestManager::new("/data/");
//! let manifest = TableManifest::new("out.c-shop.orders", ["id", "amount"])
//!     .with_primary_key(["id"])
//!     .incremental(true);
//!
//! manager.write_manifest("out/tables/orders.csv", &manifest)?;
//! assert_eq!(manager.read_manifest("out/tables/orders.csv")?, manifest);
//! # Ok(())
//! # }
//! ```
//!
//! Writes are atomic: the document is staged in a temporary file next to
//! the destination and renamed into place, so the platform never observes
//! a torn manifest.

/// Manifest error types.
pub mod error;
/// Reading and writing manifests under the data directory.
pub mod manager;
/// Manifest document types.
pub mod types;

pub use error::{InvalidManifest, ManifestError, ManifestResult, WriteFailure};
pub use manager::{MANIFEST_EXTENSION, ManifestManager};
pub use types::{FileManifest, MetadataEntry, TableManifest};
