// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # phiro-firmata
//!
//! Wire codec for the subset of the Firmata protocol spoken by the Phiro robot.
//!
//! Only three commands travel host → device:
//!
//! | Command           | Frame                      |
//! |-------------------|----------------------------|
//! | SET_PIN_MODE      | `[0xF4, pin, mode]`        |
//! | REPORT_ANALOG_PIN | `[0xC0 \| pin, enable]`     |
//! | ANALOG_MESSAGE    | `[0xE0 \| pin, lsb, msb]`   |
//!
//! Encoding is pure and stateless. Decoding ([`FrameDecoder`]) is used for
//! device → host sensor traffic and by test doubles that need to reconstruct
//! what was written.
//!
//! ## Usage
//!
//! ```rust
//! use phiro_firmata::{encode_analog_message, decode_frame, Command};
//!
//! let frame = encode_analog_message(11, 107);
//! assert_eq!(frame, [0xEB, 107, 0]);
//! assert_eq!(
//!     decode_frame(&frame).unwrap(),
//!     Command::AnalogMessage { pin: 11, value: 107 }
//! );
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod codec;
pub mod constants;
pub mod decoder;
pub mod error;

pub use codec::{
    decode_value, encode_analog_message, encode_channel, encode_report_analog_pin,
    encode_set_pin_mode, lsb, msb, Command,
};
pub use constants::*;
pub use decoder::{decode_frame, FrameDecoder};
pub use error::{FirmataError, Result};
