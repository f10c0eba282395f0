//! Process-wide `tracing` subscriber setup.

use crate::config::LoggingConfig;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, filter::ParseError};

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured filter directive does not parse.
    #[error("invalid log filter {directive:?}: {source}")]
    InvalidFilter {
        /// Directive as configured.
        directive: String,
        /// Parser error.
        #[source]
        source: ParseError,
    },

    /// A global subscriber is already installed.
    #[error("global tracing subscriber already installed: {0}")]
    AlreadyInstalled(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Installs a formatting subscriber as the global default.
///
/// `RUST_LOG` overrides `config.filter` when it is set and valid. Call once
/// at process start; a second call returns
/// [`TelemetryError::AlreadyInstalled`] and leaves the first subscriber in
/// place.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] when the configured directive
/// is malformed, or [`TelemetryError::AlreadyInstalled`].
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(TelemetryError::AlreadyInstalled)
}

/// Builds the event filter, preferring `RUST_LOG` over the configured
/// directive.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] when the configured directive
/// is malformed and `RUST_LOG` is unset or invalid.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.filter).map_err(|source| TelemetryError::InvalidFilter {
        directive: config.filter.clone(),
        source,
    })
}
