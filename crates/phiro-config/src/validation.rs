// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Pin numbers end up folded into the low nibble of Firmata command bytes, so
//! every pin must fit in four bits. Output roles must sit inside the PWM range
//! that initialization configures, and no two roles may share a pin.

use crate::{ConfigError, ConfigResult, PhiroConfig};

/// Highest pin number that fits in a Firmata channel nibble
const MAX_CHANNEL_PIN: u8 = 15;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    PinOutOfChannelRange { pin_name: String, pin: u8 },
    PinOutsidePwmRange { pin_name: String, pin: u8 },
    PinConflict { pin1: String, pin2: String, pin: u8 },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PinOutOfChannelRange { pin_name, pin } => {
                write!(
                    f,
                    "Pin {} = {} does not fit in a channel nibble (0-{})",
                    pin_name, pin, MAX_CHANNEL_PIN
                )
            }
            Self::PinOutsidePwmRange { pin_name, pin } => {
                write!(f, "Pin {} = {} is outside the PWM pin range", pin_name, pin)
            }
            Self::PinConflict { pin1, pin2, pin } => {
                write!(f, "Pin conflict: {} and {} both use pin {}", pin1, pin2, pin)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &PhiroConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_pwm_range(config, &mut errors);
    validate_output_pins(config, &mut errors);
    validate_sensor_pins(config, &mut errors);
    validate_value_ranges(config, &mut errors);

    if errors.is_empty() {
        return Ok(());
    }

    let error_messages = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::ValidationError(format!(
        "Configuration validation failed:\n{}",
        error_messages
    )))
}

fn validate_pwm_range(config: &PhiroConfig, errors: &mut Vec<ConfigValidationError>) {
    let device = &config.device;
    if device.pwm_pin_min > device.pwm_pin_max {
        errors.push(ConfigValidationError::InvalidValue {
            field: "device.pwm_pin_min".to_string(),
            reason: format!(
                "{} is greater than pwm_pin_max {}",
                device.pwm_pin_min, device.pwm_pin_max
            ),
        });
    }
    if device.pwm_pin_max > MAX_CHANNEL_PIN {
        errors.push(ConfigValidationError::PinOutOfChannelRange {
            pin_name: "device.pwm_pin_max".to_string(),
            pin: device.pwm_pin_max,
        });
    }
}

fn validate_output_pins(config: &PhiroConfig, errors: &mut Vec<ConfigValidationError>) {
    let device = &config.device;
    let pwm_range = device.pwm_pin_min..=device.pwm_pin_max;
    let named = device.pins.named_pins();

    for (name, pin) in named {
        if pin > MAX_CHANNEL_PIN {
            errors.push(ConfigValidationError::PinOutOfChannelRange {
                pin_name: format!("device.pins.{}", name),
                pin,
            });
        } else if !pwm_range.contains(&pin) {
            errors.push(ConfigValidationError::PinOutsidePwmRange {
                pin_name: format!("device.pins.{}", name),
                pin,
            });
        }
    }

    push_conflicts("device.pins", &named, errors);
}

fn validate_sensor_pins(config: &PhiroConfig, errors: &mut Vec<ConfigValidationError>) {
    let named = config.device.sensors.named_pins();

    for (name, pin) in named {
        if pin > MAX_CHANNEL_PIN {
            errors.push(ConfigValidationError::PinOutOfChannelRange {
                pin_name: format!("device.sensors.{}", name),
                pin,
            });
        }
    }

    push_conflicts("device.sensors", &named, errors);
}

fn validate_value_ranges(config: &PhiroConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.device.pwm_mode > 0x7F {
        errors.push(ConfigValidationError::InvalidValue {
            field: "device.pwm_mode".to_string(),
            reason: "must be a 7-bit Firmata data byte".to_string(),
        });
    }

    if config.connection.receive_buffer_size == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "connection.receive_buffer_size".to_string(),
            reason: "must be > 0".to_string(),
        });
    }

    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("'{}' is not one of {}", config.logging.level, LOG_LEVELS.join(", ")),
        });
    }
}

fn push_conflicts(prefix: &str, named: &[(&str, u8)], errors: &mut Vec<ConfigValidationError>) {
    for (i, (name1, pin1)) in named.iter().enumerate() {
        for (name2, pin2) in &named[i + 1..] {
            if pin1 == pin2 {
                errors.push(ConfigValidationError::PinConflict {
                    pin1: format!("{}.{}", prefix, name1),
                    pin2: format!("{}.{}", prefix, name2),
                    pin: *pin1,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &PhiroConfig) -> String {
        match validate_config(config) {
            Err(ConfigError::ValidationError(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_pin_conflict_detected() {
        let mut config = PhiroConfig::default();
        config.device.pins.rgb_red_right = config.device.pins.speaker;
        let msg = messages(&config);
        assert!(msg.contains("device.pins.speaker and device.pins.rgb_red_right both use pin 3"));
    }

    #[test]
    fn test_pin_beyond_nibble_detected() {
        let mut config = PhiroConfig::default();
        config.device.sensors.side_left = 16;
        let msg = messages(&config);
        assert!(msg.contains("device.sensors.side_left = 16"));
    }

    #[test]
    fn test_output_outside_pwm_range_detected() {
        let mut config = PhiroConfig::default();
        config.device.pins.speaker = 2;
        let msg = messages(&config);
        assert!(msg.contains("outside the PWM pin range"));
    }

    #[test]
    fn test_all_errors_reported_together() {
        let mut config = PhiroConfig::default();
        config.device.pwm_pin_min = 14;
        config.logging.level = "verbose".to_string();
        config.connection.receive_buffer_size = 0;
        let msg = messages(&config);
        assert!(msg.contains("pwm_pin_min"));
        assert!(msg.contains("logging.level"));
        assert!(msg.contains("receive_buffer_size"));
    }

    #[test]
    fn test_log_level_case_insensitive() {
        let mut config = PhiroConfig::default();
        config.logging.level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
