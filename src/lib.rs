// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Phiro - Firmata control for the Phiro educational robot
//!
//! Drives the two motors, the two RGB lights and the speaker of a Phiro robot,
//! and reads its six infrared sensors, over a serial (usually Bluetooth)
//! Firmata link.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! phiro = "0.1"  # Default: config + observability
//! ```
//!
//! ## Feature Flags
//!
//! - **`config`** (default): TOML configuration loading with env/CLI overrides
//! - **`observability`** (default): Console logging setup
//! - **`file-logging`**: Rotated JSON log files per run
//!
//! ## Usage
//!
//! ```rust
//! use phiro::prelude::*;
//!
//! let logger = ConnectionDataLogger::new();
//! let mut phiro = DeviceController::with_defaults(logger.connection_proxy());
//!
//! phiro.initialise()?;
//! phiro.move_left_motor_forward(42)?;
//! phiro.move_right_motor_forward(42)?;
//! phiro.stop_all_movements()?;
//! phiro.disconnect()?;
//! # Ok::<(), phiro::device::DeviceError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Device: phiro-device                                   │
//! │  (motors, lights, tone timer, sensor readings)          │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Protocol: phiro-firmata                                │
//! │  (SET_PIN_MODE, REPORT_ANALOG_PIN, ANALOG_MESSAGE)      │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  HAL: phiro-hal                                         │
//! │  (Connection trait, stream adapter, logging double)     │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

// Re-export foundation
pub use phiro_firmata as firmata;
pub use phiro_hal as hal;

// Re-export device layer
pub use phiro_device as device;

// Re-export infrastructure
#[cfg(feature = "config")]
pub use phiro_config as config;

#[cfg(feature = "observability")]
pub use phiro_observability as observability;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::device::{
        percent_to_speed, DeviceConfig, DeviceController, DeviceError, PinMap, Sensor, Side,
        ToneState,
    };
    pub use crate::hal::{
        Connection, ConnectionDataLogger, ConnectionError, ConnectionState, StreamConnection,
    };

    #[cfg(feature = "config")]
    pub use crate::config::{load_config, validate_config, PhiroConfig};

    #[cfg(feature = "observability")]
    pub use crate::observability::{init_logging, parse_debug_flags, CrateDebugFlags};
}
