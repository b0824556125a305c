//! Configuration module.
//!
//! Loads the TOML configuration naming the validator implementations, the
//! rule artifact repository and the storage retry period, and checks that
//! every required field is present.

mod config;

pub use config::{Config, ConfigError, LoggingSettings, StorageSettings};
