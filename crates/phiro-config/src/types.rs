// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `phiro_configuration.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PhiroConfig {
    pub device: DeviceSection,
    pub connection: ConnectionSection,
    pub logging: LoggingSection,
}

/// Pin layout and modes of the robot firmware
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DeviceSection {
    /// Firmata mode byte written for every PWM pin during initialization
    pub pwm_mode: u8,
    /// First pin (inclusive) configured as PWM output
    pub pwm_pin_min: u8,
    /// Last pin (inclusive) configured as PWM output
    pub pwm_pin_max: u8,
    pub pins: PinSection,
    pub sensors: SensorSection,
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            pwm_mode: 3,
            pwm_pin_min: 3,
            pwm_pin_max: 13,
            pins: PinSection::default(),
            sensors: SensorSection::default(),
        }
    }
}

/// Output pin assignment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PinSection {
    pub speaker: u8,
    pub rgb_red_left: u8,
    pub rgb_green_left: u8,
    pub rgb_blue_left: u8,
    pub rgb_red_right: u8,
    pub rgb_green_right: u8,
    pub rgb_blue_right: u8,
    pub motor_left_backward: u8,
    pub motor_left_forward: u8,
    pub motor_right_forward: u8,
    pub motor_right_backward: u8,
}

impl Default for PinSection {
    fn default() -> Self {
        Self {
            speaker: 3,
            rgb_red_left: 4,
            rgb_green_left: 5,
            rgb_blue_left: 6,
            rgb_red_right: 7,
            rgb_green_right: 8,
            rgb_blue_right: 9,
            motor_left_backward: 10,
            motor_left_forward: 11,
            motor_right_forward: 12,
            motor_right_backward: 13,
        }
    }
}

impl PinSection {
    /// `(name, pin)` pairs in declaration order
    pub fn named_pins(&self) -> [(&'static str, u8); 11] {
        [
            ("speaker", self.speaker),
            ("rgb_red_left", self.rgb_red_left),
            ("rgb_green_left", self.rgb_green_left),
            ("rgb_blue_left", self.rgb_blue_left),
            ("rgb_red_right", self.rgb_red_right),
            ("rgb_green_right", self.rgb_green_right),
            ("rgb_blue_right", self.rgb_blue_right),
            ("motor_left_backward", self.motor_left_backward),
            ("motor_left_forward", self.motor_left_forward),
            ("motor_right_forward", self.motor_right_forward),
            ("motor_right_backward", self.motor_right_backward),
        ]
    }
}

/// Analog input pin assignment of the six infrared sensors
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SensorSection {
    pub side_right: u8,
    pub front_right: u8,
    pub bottom_right: u8,
    pub bottom_left: u8,
    pub front_left: u8,
    pub side_left: u8,
}

impl Default for SensorSection {
    fn default() -> Self {
        Self {
            side_right: 0,
            front_right: 1,
            bottom_right: 2,
            bottom_left: 3,
            front_left: 4,
            side_left: 5,
        }
    }
}

impl SensorSection {
    /// `(name, pin)` pairs in declaration order
    pub fn named_pins(&self) -> [(&'static str, u8); 6] {
        [
            ("side_right", self.side_right),
            ("front_right", self.front_right),
            ("bottom_right", self.bottom_right),
            ("bottom_left", self.bottom_left),
            ("front_left", self.front_left),
            ("side_left", self.side_left),
        ]
    }
}

/// Transport settings (the port itself is opened by the caller)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectionSection {
    /// Serial device path, e.g. `/dev/rfcomm0`
    pub serial_port: String,
    /// Size of the buffer used for each sensor poll read
    pub receive_buffer_size: usize,
}

impl Default for ConnectionSection {
    fn default() -> Self {
        Self {
            serial_port: "/dev/rfcomm0".to_string(),
            receive_buffer_size: 64,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSection {
    /// trace, debug, info, warn or error
    pub level: String,
    /// Base directory for file logs; console only when unset
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
        }
    }
}
