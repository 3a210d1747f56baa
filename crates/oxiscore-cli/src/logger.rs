//! Structured logging with tracing.

use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the global subscriber; `RUST_LOG` overrides the default level.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
