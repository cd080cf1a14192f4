//! Engine configuration.
//!
//! Provides configuration file support via `serieskit.toml`, environment
//! variables, and builder overrides.
//!
//! # Priority (highest to lowest)
//!
//! 1. Builder overrides
//! 2. Environment variables (`SERIESKIT_*`)
//! 3. Configuration file (`serieskit.toml`)
//! 4. Default values
//!
//! A configuration is an immutable value handed to [`Engine::new`](crate::Engine::new);
//! nothing here is process-global.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default minimum index length routed to the partitioned executor.
/// Below this, sequential is faster due to overhead.
pub const DEFAULT_MIN_PARALLEL_LEN: usize = 10_000;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to parse configuration.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue {
        /// Configuration key that failed validation.
        key: String,
        /// Validation error message.
        message: String,
    },
}

/// Worker thread configuration for the partitioned executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadConfig {
    /// Detect the thread count from the available cores.
    #[default]
    Auto,
    /// Use a fixed number of threads.
    Fixed(usize),
}

impl ThreadConfig {
    /// Returns the effective number of threads to use.
    #[must_use]
    pub fn effective_threads(&self) -> usize {
        match self {
            Self::Auto => {
                let cpus = std::thread::available_parallelism()
                    .map(std::num::NonZeroUsize::get)
                    .unwrap_or(1);
                // Leave 1 core for the calling thread, minimum 1 thread
                cpus.saturating_sub(1).max(1)
            }
            Self::Fixed(n) => *n,
        }
    }
}

/// Execution engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Enables the partitioned executor.
    pub parallel: bool,
    /// Minimum index length that selects the partitioned executor.
    pub min_parallel_len: usize,
    /// Worker thread configuration (also the partition count).
    pub threads: ThreadConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            min_parallel_len: DEFAULT_MIN_PARALLEL_LEN,
            threads: ThreadConfig::Auto,
        }
    }
}

impl EngineConfig {
    /// Creates a config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config that never leaves the calling thread.
    #[must_use]
    pub fn sequential_only() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    /// Builder: set the parallel threshold.
    #[must_use]
    pub fn with_min_parallel_len(mut self, len: usize) -> Self {
        self.min_parallel_len = len;
        self
    }

    /// Builder: set a fixed thread count.
    #[must_use]
    pub fn with_fixed_threads(mut self, count: usize) -> Self {
        self.threads = ThreadConfig::Fixed(count);
        self
    }

    /// Builder: enable or disable the partitioned executor.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Determines if an input of `len` positions should run partitioned.
    #[must_use]
    pub fn should_parallelize(&self, len: usize) -> bool {
        self.parallel && len > self.min_parallel_len
    }

    /// Gets the effective thread count for this config.
    #[must_use]
    pub fn effective_threads(&self) -> usize {
        self.threads.effective_threads()
    }

    /// Loads configuration from default sources.
    ///
    /// Priority: defaults < file < environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("serieskit.toml")
    }

    /// Loads configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("SERIESKIT_"));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Creates a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml_str));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads == ThreadConfig::Fixed(0) {
            return Err(ConfigError::InvalidValue {
                key: "threads".to_string(),
                message: "fixed thread count must be at least 1".to_string(),
            });
        }

        if self.parallel && self.min_parallel_len == 0 {
            return Err(ConfigError::InvalidValue {
                key: "min_parallel_len".to_string(),
                message: "must be at least 1 when parallel is enabled; set parallel = false to keep every call on the calling thread".to_string(),
            });
        }

        Ok(())
    }

    /// Serializes the configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}
