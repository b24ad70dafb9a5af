//! Tracing subscriber setup
//!
//! The connector crates only emit `tracing` events. Binaries and tests
//! decide where they go by calling [`init_tracing`] once at startup.

use std::io;

use hostlink_domain::{ConnectorError, ConnectorResult, LoggingConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Resolve the filter: `RUST_LOG` first, then the configured directive.
///
/// # Errors
/// Returns `ConnectorError::Config` if the configured directive is invalid.
pub fn env_filter(config: &LoggingConfig) -> ConnectorResult<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| ConnectorError::Config(format!("Invalid log filter '{}': {e}", config.filter)))
}

/// Install a global subscriber writing to stderr.
///
/// Plain text by default, one JSON object per line when `config.json` is
/// set.
///
/// # Errors
/// Returns `ConnectorError::Config` for an invalid filter or when a global
/// subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> ConnectorResult<()> {
    let subscriber = tracing_subscriber::registry().with(env_filter(config)?);

    let result = if config.json {
        subscriber.with(fmt::layer().json().with_writer(io::stderr)).try_init()
    } else {
        subscriber.with(fmt::layer().with_writer(io::stderr)).try_init()
    };

    result.map_err(|e| ConnectorError::Config(format!("Failed to install tracing subscriber: {e}")))?;
    tracing::debug!(filter = %config.filter, json = config.json, "tracing initialized");
    Ok(())
}
