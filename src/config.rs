//! Runtime configuration for the scheduling services.
//!
//! Configuration is read from TOML. Every section and key is optional and
//! falls back to the defaults below:
//!
//! ```toml
//! [proposals]
//! max_reason_chars = 2000
//! max_comment_chars = 4000
//!
//! [logging]
//! filter = "info"
//! json = false
//!
//! [database]
//! url = "postgres://localhost/keystone"
//! max_connections = 8
//! ```

use crate::schedule::domain::ProposalLimits;
use serde::Deserialize;
use std::{fs, io, path::Path};
use thiserror::Error;

/// Top-level scheduling configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulingConfig {
    /// Change proposal text limits.
    pub proposals: ProposalConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
    /// Database connection settings.
    pub database: DatabaseConfig,
}

impl SchedulingConfig {
    /// Parses configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys and
    /// [`ConfigError::Invalid`] when a value is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use keystone::config::SchedulingConfig;
    ///
    /// let config = SchedulingConfig::from_toml_str("[proposals]\nmax_reason_chars = 80\n")?;
    /// assert_eq!(config.proposals.max_reason_chars, 80);
    /// assert_eq!(config.proposals.max_comment_chars, 4000);
    /// # Ok::<(), keystone::config::ConfigError>(())
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read, plus the
    /// errors of [`Self::from_toml_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = path.as_ref();
        let contents = fs::read_to_string(file).map_err(|source| ConfigError::Read {
            path: file.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.proposals.max_reason_chars == 0 {
            return Err(ConfigError::Invalid {
                key: "proposals.max_reason_chars",
                reason: "must be at least 1",
            });
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "database.max_connections",
                reason: "must be at least 1",
            });
        }
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "logging.filter",
                reason: "must not be empty",
            });
        }
        Ok(())
    }
}

/// Change proposal text limits, counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProposalConfig {
    /// Maximum reason length.
    pub max_reason_chars: usize,
    /// Maximum comment length.
    pub max_comment_chars: usize,
}

impl ProposalConfig {
    /// Returns the limits handed to the proposal service.
    #[must_use]
    pub const fn limits(&self) -> ProposalLimits {
        ProposalLimits {
            max_reason_chars: self.max_reason_chars,
            max_comment_chars: self.max_comment_chars,
        }
    }
}

impl Default for ProposalConfig {
    fn default() -> Self {
        let limits = ProposalLimits::default();
        Self {
            max_reason_chars: limits.max_reason_chars,
            max_comment_chars: limits.max_comment_chars,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing` filter directive, such as `info` or `keystone=debug`.
    ///
    /// `RUST_LOG` takes precedence when set.
    pub filter: String,
    /// Emit one JSON object per event instead of human-readable lines.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            json: false,
        }
    }
}

/// Database connection settings for the `PostgreSQL` adapter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Connection URL, passed to
    /// [`crate::schedule::adapters::postgres::PostgresScheduleRepository::connect`].
    pub url: Option<String>,
    /// Maximum pooled connections.
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 8,
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration from {path}: {source}")]
    Read {
        /// File path as given.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The document is not valid TOML or does not match the schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid configuration value for {key}: {reason}")]
    Invalid {
        /// Dotted key path.
        key: &'static str,
        /// What is wrong with the value.
        reason: &'static str,
    },
}
