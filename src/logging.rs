//! Logging setup for the binary.
//!
//! A single fmt layer on stderr behind an [`EnvFilter`]. The filter comes from
//! the explicit override if given, else `RUST_LOG`, else [`DEFAULT_FILTER`].
//! Stdout stays reserved for the confirmed order id.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Filter used when neither an override nor `RUST_LOG` is set.
pub const DEFAULT_FILTER: &str = "slotvisor=info";

/// Resolves the filter directive: override, then `RUST_LOG`, then the default.
pub fn build_filter(directive: Option<&str>) -> EnvFilter {
    match directive {
        Some(d) => EnvFilter::try_new(d).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    }
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_logging(directive: Option<&str>) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(build_filter(directive))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
}
