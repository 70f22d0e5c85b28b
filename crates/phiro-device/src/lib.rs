// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # phiro-device
//!
//! Controller for the Phiro educational robot.
//!
//! [`DeviceController`] turns high level requests (move a motor, light an
//! RGB LED, play a tone) into Firmata frames and writes them through a
//! [`phiro_hal::Connection`]. All writes go through one locked link, so the
//! frames of a multi-frame operation are never interleaved with another
//! operation's frames.
//!
//! ## Usage
//!
//! ```rust
//! use phiro_device::DeviceController;
//! use phiro_hal::ConnectionDataLogger;
//!
//! let logger = ConnectionDataLogger::new();
//! let mut phiro = DeviceController::with_defaults(logger.connection_proxy());
//!
//! phiro.initialise().unwrap();
//! phiro.move_left_motor_forward(42).unwrap();
//! phiro.set_right_rgb_light_color(242, 0, 3).unwrap();
//! phiro.disconnect().unwrap();
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod controller;
pub mod error;
mod link;
pub mod pins;
pub mod sensors;
pub mod tone;

pub use controller::DeviceController;
pub use error::{DeviceError, Result};
pub use pins::{
    percent_to_speed, DeviceConfig, MotorPins, PinMap, RgbPins, Sensor, Side, MAX_SPEED, PWM_MODE,
};
pub use sensors::{SensorReading, SensorReadings};
pub use tone::{CancellationToken, ToneState};
