// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Phiro Configuration System
//!
//! Type-safe configuration loader for the Phiro controller with support for:
//! - TOML file parsing
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! ## Usage
//!
//! ```rust,no_run
//! use phiro_config::{load_config, validate_config};
//!
//! let config = load_config(None, None).expect("Failed to load config");
//! validate_config(&config).expect("Invalid config");
//!
//! println!("Serial port: {}", config.connection.serial_port);
//! println!("Speaker pin: {}", config.device.pins.speaker);
//! ```
//!
//! Every section has defaults matching the stock Phiro firmware, so an empty
//! file (or no file at all, via `PhiroConfig::default()`) is a valid setup.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{apply_cli_overrides, apply_environment_overrides, find_config_file, load_config};
pub use types::*;
pub use validation::{validate_config, ConfigValidationError};

/// Re-export for convenience
pub use serde;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PhiroConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_pin_conflict_reported_as_validation_error() {
        let mut config = PhiroConfig::default();
        config.device.pins.speaker = config.device.pins.rgb_red_left;

        match validate_config(&config) {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains("speaker"), "unexpected message: {}", msg);
            }
            other => panic!("expected ValidationError, got {:?}", other),
        }
    }
}
