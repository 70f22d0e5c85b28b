// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Frame encoding and the lsb/msb value split

use crate::constants::*;

/// Low 7 bits of a value
pub const fn lsb(value: u16) -> u8 {
    (value & DATA_MASK as u16) as u8
}

/// Bits 7..14 of a value
pub const fn msb(value: u16) -> u8 {
    ((value >> 7) & DATA_MASK as u16) as u8
}

/// Rebuild a value from its lsb/msb pair
pub const fn decode_value(lsb: u8, msb: u8) -> u16 {
    ((msb & DATA_MASK) as u16) << 7 | (lsb & DATA_MASK) as u16
}

/// Fold a pin number into a command's channel nibble
///
/// # Panics
/// If `pin` does not fit in four bits.
pub const fn encode_channel(pin: u8) -> u8 {
    assert!(pin <= MAX_CHANNEL, "pin does not fit in a channel nibble");
    pin
}

/// `[0xF4, pin, mode]`
pub const fn encode_set_pin_mode(pin: u8, mode: u8) -> [u8; 3] {
    [SET_PIN_MODE, pin, mode]
}

/// `[0xC0 | pin, enable]`
///
/// # Panics
/// If `pin` does not fit in four bits.
pub const fn encode_report_analog_pin(pin: u8, enable: bool) -> [u8; 2] {
    [REPORT_ANALOG_PIN | encode_channel(pin), enable as u8]
}

/// `[0xE0 | pin, lsb(value), msb(value)]`
///
/// # Panics
/// If `pin` does not fit in four bits or `value` exceeds 14 bits.
pub const fn encode_analog_message(pin: u8, value: u16) -> [u8; 3] {
    assert!(value <= MAX_ANALOG_VALUE, "analog value exceeds 14 bits");
    [ANALOG_MESSAGE | encode_channel(pin), lsb(value), msb(value)]
}

/// A decoded Firmata command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetPinMode { pin: u8, mode: u8 },
    ReportAnalogPin { pin: u8, enable: bool },
    AnalogMessage { pin: u8, value: u16 },
    /// Digital port state, only ever sent by the device
    DigitalMessage { port: u8, value: u16 },
    /// Firmware protocol version, only ever sent by the device
    ReportVersion { major: u8, minor: u8 },
}

impl Command {
    /// Wire frame for this command
    pub fn to_bytes(&self) -> Vec<u8> {
        match *self {
            Command::SetPinMode { pin, mode } => encode_set_pin_mode(pin, mode).to_vec(),
            Command::ReportAnalogPin { pin, enable } => {
                encode_report_analog_pin(pin, enable).to_vec()
            }
            Command::AnalogMessage { pin, value } => encode_analog_message(pin, value).to_vec(),
            Command::DigitalMessage { port, value } => {
                vec![DIGITAL_MESSAGE | encode_channel(port), lsb(value), msb(value)]
            }
            Command::ReportVersion { major, minor } => vec![REPORT_VERSION, major, minor],
        }
    }

    /// Pin (or port) addressed by the command, if any
    pub fn pin(&self) -> Option<u8> {
        match *self {
            Command::SetPinMode { pin, .. }
            | Command::ReportAnalogPin { pin, .. }
            | Command::AnalogMessage { pin, .. } => Some(pin),
            Command::DigitalMessage { port, .. } => Some(port),
            Command::ReportVersion { .. } => None,
        }
    }
}
