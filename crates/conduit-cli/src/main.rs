//! Conduit CLI - inspect a component data directory.
//!
//! Runs the built-in inspection component through the regular bootstrap:
//! the data directory comes from `KBC_DATADIR`, `config.json` is validated
//! against the base definition, and every input table manifest is read and
//! summarized in the log. The exit code follows the component contract.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod inspect;

use std::process::ExitCode;

fn main() -> ExitCode {
    conduit_runtime::run_component(inspect::Inspect)
}
