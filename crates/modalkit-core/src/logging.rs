#![forbid(unsafe_code)]

//! JSON log output for production embeddings.
//!
//! Library code only emits `tracing` events; installing a subscriber is the
//! embedding application's call. This helper wires the usual setup: JSON
//! lines, filter taken from `RUST_LOG` with a caller-supplied fallback.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Error returned when a global subscriber is already installed.
#[derive(Debug)]
pub struct LoggingInitError(String);

impl std::fmt::Display for LoggingInitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to install log subscriber: {}", self.0)
    }
}

impl std::error::Error for LoggingInitError {}

/// Install a global JSON subscriber.
///
/// `default_filter` is used when `RUST_LOG` is unset or unparsable,
/// e.g. `"modalkit_widgets=debug"`.
///
/// # Errors
///
/// Returns [`LoggingInitError`] if a global subscriber is already set.
pub fn init_json(default_filter: &str) -> Result<(), LoggingInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_current_span(false))
        .try_init()
        .map_err(|err| LoggingInitError(err.to_string()))
}
