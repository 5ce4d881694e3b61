//! Structured logging setup.
//!
//! Everything goes to stderr; stdout is reserved for job responses.

use crate::error::{Result, WorkerError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter directive for the given CLI flags.
///
/// `quiet` wins over any verbosity.
pub fn level_directive(quiet: bool, verbosity: u8) -> &'static str {
    if quiet {
        return "error";
    }
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. A non-empty `RUST_LOG` overrides the flags.
///
/// Fails if a subscriber is already installed.
pub fn init_logging(quiet: bool, verbosity: u8) -> Result<()> {
    let fallback = level_directive(quiet, verbosity);
    let env_filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => {
            EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(fallback))
        }
        _ => EnvFilter::new(fallback),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbosity > 0),
        )
        .try_init()
        .map_err(|e| WorkerError::Other(format!("Failed to initialize logging: {}", e)))
}
