//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber. Output goes to
//! stdout in either JSON or human-readable form; the `RUST_LOG` environment
//! variable refines the configured default level per target.

use std::io;

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use crate::domain::models::LoggingConfig;

/// Initialize the global tracing subscriber from the logging config.
///
/// # Errors
/// Returns an error on an unknown level or format, or if a global
/// subscriber was already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let default_level = parse_log_level(&config.level)?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    match config.format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_writer(io::stdout)
                .with_env_filter(env_filter)
                .with_current_span(true)
                .with_target(true)
                .try_init()
                .map_err(|e| anyhow::anyhow!("failed to install subscriber: {e}"))?;
        }
        "pretty" => {
            tracing_subscriber::fmt()
                .pretty()
                .with_writer(io::stdout)
                .with_env_filter(env_filter)
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE)
                .try_init()
                .map_err(|e| anyhow::anyhow!("failed to install subscriber: {e}"))?;
        }
        other => anyhow::bail!("unknown log format: {other}"),
    }

    Ok(())
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => anyhow::bail!("unknown log level: {other}"),
    }
}
