// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for Firmata decoding

/// Result type alias using FirmataError
pub type Result<T> = std::result::Result<T, FirmataError>;

/// Errors raised while decoding device → host traffic
///
/// Encoding never fails at runtime: invalid pins and values are programmer
/// errors and panic instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FirmataError {
    /// Status byte not understood by this codec
    #[error("Unknown command byte: 0x{0:02X}")]
    UnknownCommand(u8),

    /// Data byte (high bit clear) found where a status byte was expected
    #[error("Unexpected data byte without command: 0x{0:02X}")]
    UnexpectedDataByte(u8),

    /// A new command started before the previous frame was complete
    #[error("Frame for command 0x{0:02X} was truncated")]
    Truncated(u8),

    /// Frame slice length does not match the command's frame size
    #[error("Frame for command 0x{command:02X} has length {actual}, expected {expected}")]
    InvalidLength {
        command: u8,
        expected: usize,
        actual: usize,
    },

    /// Sysex block received; its content is not interpreted
    #[error("Unsupported sysex command: 0x{0:02X}")]
    UnsupportedSysex(u8),
}
