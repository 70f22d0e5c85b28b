// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Firmata command bytes used by the Phiro robot

/// Set a pin to INPUT/OUTPUT/PWM/etc
pub const SET_PIN_MODE: u8 = 0xF4;
/// Enable or disable analog reporting for a pin (pin folded into low nibble)
pub const REPORT_ANALOG_PIN: u8 = 0xC0;
/// Analog/PWM value for a pin (pin folded into low nibble)
pub const ANALOG_MESSAGE: u8 = 0xE0;

/// Upper bound of the REPORT_ANALOG_PIN channel range
pub const REPORT_ANALOG_PIN_BOUND: u8 = 0xCF;
/// Upper bound of the ANALOG_MESSAGE channel range
pub const ANALOG_MESSAGE_BOUND: u8 = 0xEF;

/// Digital port message (device → host only)
pub const DIGITAL_MESSAGE: u8 = 0x90;
/// Upper bound of the DIGITAL_MESSAGE port range
pub const DIGITAL_MESSAGE_BOUND: u8 = 0x9F;
/// Protocol version report (device → host only)
pub const REPORT_VERSION: u8 = 0xF9;
/// Start of a sysex block
pub const START_SYSEX: u8 = 0xF0;
/// End of a sysex block
pub const END_SYSEX: u8 = 0xF7;
/// Longest sysex body buffered while waiting for END_SYSEX
pub const MAX_SYSEX_LEN: usize = 1024;

/// Highest pin that still fits in a command's channel nibble
pub const MAX_CHANNEL: u8 = 0x0F;
/// Largest value representable by the 7+7 bit lsb/msb split
pub const MAX_ANALOG_VALUE: u16 = 0x3FFF;

/// Mask selecting the 7 data bits of a payload byte
pub const DATA_MASK: u8 = 0x7F;
