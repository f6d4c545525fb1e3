//! Logging initialization for the `cchfix` binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to whoever embeds it. Test suites usually want nothing, the CLI wants
//! human-readable lines on stderr.

use crate::errors::{FixtureError, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install a stderr subscriber. `RUST_LOG` takes precedence over `default_level`.
pub fn init_tracing(default_level: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()
        .map_err(|e| FixtureError::ConfigError(format!("Failed to initialize logging: {}", e)))?;

    Ok(())
}
