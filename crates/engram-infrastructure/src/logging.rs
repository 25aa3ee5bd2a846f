//! Structured logging with tracing
//!
//! Centralized logging configuration using the tracing ecosystem, with an
//! env-filter level override and optional JSON output.

use engram_domain::error::Result;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Initialise the global tracing subscriber.
///
/// Safe to call more than once; later calls are no-ops.
///
/// # Errors
///
/// Never fails today; the `Result` keeps the signature stable for sinks
/// that can (files, remote collectors).
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if result.is_err() {
        tracing::debug!("Logging already initialised");
    }
    Ok(())
}

/// Parse a level string, falling back to `info` on unknown input.
#[must_use]
pub fn parse_log_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "error" => tracing::Level::ERROR,
        "warn" => tracing::Level::WARN,
        "debug" => tracing::Level::DEBUG,
        "trace" => tracing::Level::TRACE,
        _ => tracing::Level::INFO,
    }
}
