//! Configuration structures for the validation subsystem.
//!
//! The configuration is read once at startup from a TOML file and is
//! immutable afterwards. Each validator section names the registry key of the
//! implementation to instantiate; implementation-specific settings live in a
//! nested `config` table.
//!
//! # Example TOML
//! ```toml
//! [policy_validator]
//! name = "policy-validator"
//! implementation = "default"
//!
//! [policy_validator.config]
//! nexus_name = "nexus"
//! nexus_port = 8081
//!
//! [payload_validator]
//! name = "payload-validator"
//! implementation = "default"
//!
//! [storage]
//! retry_period_seconds = 10
//! ```

use crate::repository::RepositorySettings;
use crate::validators::ValidatorConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Native policy validator (needs repository coordinates)
    #[serde(default)]
    pub policy_validator: ValidatorConfig,

    /// Payload validator
    #[serde(default)]
    pub payload_validator: ValidatorConfig,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Storage provider retrieval settings
///
/// The service embedding this crate passes `retry_period_seconds` to
/// [`storage::retrieve`](crate::storage::retrieve) when it opens its
/// storage provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageSettings {
    /// Delay between attempts to reach the storage provider (default: 10)
    #[serde(default = "default_retry_period")]
    pub retry_period_seconds: u64,
}

fn default_retry_period() -> u64 {
    10
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            retry_period_seconds: default_retry_period(),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by `RUST_LOG` (default: info)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Configuration loading and validation failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0} must be specified")]
    MissingField(String),

    #[error("{field} is invalid: {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    /// Prefix the field name with the section it was found in
    pub(crate) fn within(self, section: &str) -> Self {
        match self {
            ConfigError::MissingField(field) => {
                ConfigError::MissingField(format!("{}.{}", section, field))
            }
            ConfigError::Invalid { field, reason } => ConfigError::Invalid {
                field: format!("{}.{}", section, field),
                reason,
            },
            other => other,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parse configuration from TOML text
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Check that every required field is present
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::validate_validator("policy_validator", &self.policy_validator)?;
        RepositorySettings::from_validator_config(&self.policy_validator)
            .map_err(|e| e.within("policy_validator"))?;

        Self::validate_validator("payload_validator", &self.payload_validator)?;

        if self.storage.retry_period_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: "storage.retry_period_seconds".to_string(),
                reason: "retry period must be greater than 0".to_string(),
            });
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::MissingField("logging.level".to_string()));
        }

        Ok(())
    }

    fn validate_validator(section: &str, config: &ValidatorConfig) -> Result<(), ConfigError> {
        if config.name.trim().is_empty() {
            return Err(ConfigError::MissingField(format!("{}.name", section)));
        }
        if config.implementation.trim().is_empty() {
            return Err(ConfigError::MissingField(format!("{}.implementation", section)));
        }
        Ok(())
    }
}
