//! `tracing` subscriber setup for binaries and scripts built on this crate.
//!
//! The library itself only emits events; installing a subscriber is left to
//! the process entry point, which calls [`init_logging`] once.

use tracing_subscriber::EnvFilter;

/// Builds the filter: `RUST_LOG` when set and valid, otherwise `default_level`.
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Installs a formatted stderr subscriber.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_logging(default_level: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
