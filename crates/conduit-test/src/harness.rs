//! Logging harness for tests.
//!
//! Tests must not install a global subscriber: the first one wins for the
//! whole test binary. Use these subscribers with
//! [`tracing::subscriber::with_default`] instead.

use conduit_telemetry::Diagnostics;
use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// A subscriber that prints through the test writer (captured by libtest)
/// and feeds `diagnostics`.
///
/// The print level comes from `RUST_LOG`, defaulting to `debug`.
#[must_use]
pub fn test_subscriber(diagnostics: &Diagnostics) -> impl Subscriber + Send + Sync + 'static {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_test_writer()
                .compact()
                .with_filter(filter),
        )
        .with(diagnostics.layer())
}

/// Run `f` under [`test_subscriber`] and return its result.
pub fn with_test_logging<T>(diagnostics: &Diagnostics, f: impl FnOnce() -> T) -> T {
    tracing::subscriber::with_default(test_subscriber(diagnostics), f)
}
