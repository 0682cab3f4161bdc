//! Configuration loading and typed config structures for the history.
//!
//! Configuration is read from a YAML file whose structure is mirrored by
//! [`HistoryConfig`]. Every field has a default, so an empty file is a valid
//! configuration.

use std::num::NonZeroUsize;
use std::path::Path;

use serde::Deserialize;

/// Environment variable that overrides [`HistoryConfig::capacity`].
pub const CAPACITY_ENV: &str = "ENCOUNTER_HISTORY_CAPACITY";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but holds an unusable value.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level history configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryConfig {
    /// How many completed encounters are retained before the oldest is
    /// evicted. Must be at least 1.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            logging: LoggingConfig::default(),
        }
    }
}

impl HistoryConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `ENCOUNTER_HISTORY_CAPACITY` overrides `capacity` when set to a
    /// valid integer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if the capacity is zero.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, applying environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if the capacity is zero.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Self::parse_with_env(yaml, process_env)
    }

    /// Parse with environment lookups answered by `env`.
    fn parse_with_env(
        yaml: &str,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_overrides_from(env);
        config.validated_capacity()?;
        Ok(config)
    }

    /// Override fields from environment variables.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(process_env);
    }

    fn apply_overrides_from(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = env(CAPACITY_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(capacity) => self.capacity = capacity,
                Err(err) => {
                    tracing::warn!(var = CAPACITY_ENV, value = %raw, %err, "Ignoring capacity override");
                }
            }
        }
    }

    /// Return the capacity as a [`NonZeroUsize`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the capacity is zero.
    pub fn validated_capacity(&self) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.capacity).ok_or_else(|| ConfigError::Invalid {
            reason: "capacity must be at least 1".to_owned(),
        })
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error) when `RUST_LOG`
    /// is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

const fn default_capacity() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_owned()
}
