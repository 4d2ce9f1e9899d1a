//! Conduit Test - Shared test utilities for conduit components.
//!
//! This crate provides temporary data directories, ready-made
//! configurations and manifests, and a logging harness that never installs
//! a global subscriber.
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! conduit-test.workspace = true
//! ```
//!
//! Then use in your tests:
//!
//! ```rust,ignore
//! #[cfg(test)]
//! mod tests {
//!     use conduit_test::{DataDirFixture, orders_config};
//!
//!     #[test]
//!     fn test_bootstrap() {
//!         let fixture = DataDirFixture::new().with_config(&orders_config());
//!         let app: Application =
//!             Application::bootstrap(&BaseDefinition, Some(fixture.env_value())).unwrap();
//!         assert_eq!(app.config().action(), "run");
//!     }
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod harness;

pub use fixtures::*;
pub use harness::*;
