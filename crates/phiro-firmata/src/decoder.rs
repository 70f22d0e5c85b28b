// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Streaming decoder for Firmata frames
//!
//! Bytes arrive from the transport in arbitrary chunks. [`FrameDecoder`]
//! buffers them and yields one [`Command`] per complete frame. Incomplete
//! frames stay buffered until more bytes are pushed.

use std::collections::VecDeque;

use tracing::debug;

use crate::codec::{decode_value, Command};
use crate::constants::*;
use crate::error::{FirmataError, Result};

/// Frame length (status byte included) for a status byte, `None` for sysex
fn frame_len(status: u8) -> Result<Option<usize>> {
    match status {
        SET_PIN_MODE => Ok(Some(3)),
        REPORT_ANALOG_PIN..=REPORT_ANALOG_PIN_BOUND => Ok(Some(2)),
        ANALOG_MESSAGE..=ANALOG_MESSAGE_BOUND => Ok(Some(3)),
        DIGITAL_MESSAGE..=DIGITAL_MESSAGE_BOUND => Ok(Some(3)),
        REPORT_VERSION => Ok(Some(3)),
        START_SYSEX => Ok(None),
        other => Err(FirmataError::UnknownCommand(other)),
    }
}

fn build_command(status: u8, data: &[u8]) -> Command {
    match status {
        SET_PIN_MODE => Command::SetPinMode {
            pin: data[0],
            mode: data[1],
        },
        REPORT_ANALOG_PIN..=REPORT_ANALOG_PIN_BOUND => Command::ReportAnalogPin {
            pin: status & MAX_CHANNEL,
            enable: data[0] != 0,
        },
        ANALOG_MESSAGE..=ANALOG_MESSAGE_BOUND => Command::AnalogMessage {
            pin: status & MAX_CHANNEL,
            value: decode_value(data[0], data[1]),
        },
        DIGITAL_MESSAGE..=DIGITAL_MESSAGE_BOUND => Command::DigitalMessage {
            port: status & MAX_CHANNEL,
            value: decode_value(data[0], data[1]),
        },
        _ => Command::ReportVersion {
            major: data[0],
            minor: data[1],
        },
    }
}

/// Decode exactly one complete frame
pub fn decode_frame(frame: &[u8]) -> Result<Command> {
    let status = *frame.first().ok_or(FirmataError::Truncated(0))?;
    if status & 0x80 == 0 {
        return Err(FirmataError::UnexpectedDataByte(status));
    }
    let expected = match frame_len(status)? {
        Some(len) => len,
        None => return Err(FirmataError::UnsupportedSysex(frame.get(1).copied().unwrap_or(0))),
    };
    if frame.len() != expected {
        return Err(FirmataError::InvalidLength {
            command: status,
            expected,
            actual: frame.len(),
        });
    }
    if frame[1..].iter().any(|b| b & 0x80 != 0) {
        return Err(FirmataError::Truncated(status));
    }
    Ok(build_command(status, &frame[1..]))
}

/// Incremental decoder over a device → host byte stream
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: VecDeque<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes read from the transport
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes.iter().copied());
    }

    /// Number of bytes waiting for a complete frame
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Next complete command, `None` when more bytes are needed
    ///
    /// Malformed input is reported as an error and skipped, so callers can
    /// keep draining after an `Err`.
    pub fn next_command(&mut self) -> Option<Result<Command>> {
        let status = *self.buffer.front()?;

        if status & 0x80 == 0 {
            self.buffer.pop_front();
            return Some(Err(FirmataError::UnexpectedDataByte(status)));
        }

        let len = match frame_len(status) {
            Ok(Some(len)) => len,
            Ok(None) => return self.skip_sysex(),
            Err(e) => {
                self.buffer.pop_front();
                return Some(Err(e));
            }
        };

        // A status byte inside the payload means the frame was cut short
        if let Some(offset) = self
            .buffer
            .iter()
            .skip(1)
            .take(len - 1)
            .position(|b| b & 0x80 != 0)
        {
            self.buffer.drain(..=offset);
            debug!("[FIRMATA] Dropped truncated frame for 0x{:02X}", status);
            return Some(Err(FirmataError::Truncated(status)));
        }

        if self.buffer.len() < len {
            return None;
        }

        let frame: Vec<u8> = self.buffer.drain(..len).collect();
        Some(Ok(build_command(status, &frame[1..])))
    }

    /// Drop a sysex message
    ///
    /// A status byte other than END_SYSEX inside the body means the
    /// terminator was lost: the sysex is dropped up to that byte and decoding
    /// resumes there. A body longer than [`MAX_SYSEX_LEN`] without any status
    /// byte is dropped whole.
    fn skip_sysex(&mut self) -> Option<Result<Command>> {
        let command = self.buffer.get(1).copied().unwrap_or(0);
        let status_at = self
            .buffer
            .iter()
            .skip(1)
            .position(|b| b & 0x80 != 0)
            .map(|offset| offset + 1);

        match status_at {
            Some(end) if self.buffer[end] == END_SYSEX => {
                self.buffer.drain(..=end);
                Some(Err(FirmataError::UnsupportedSysex(command)))
            }
            Some(end) => {
                self.buffer.drain(..end);
                debug!("[FIRMATA] Dropped sysex 0x{:02X} missing its terminator", command);
                Some(Err(FirmataError::Truncated(START_SYSEX)))
            }
            None if self.buffer.len() > MAX_SYSEX_LEN => {
                debug!(
                    "[FIRMATA] Dropped {} bytes of runaway sysex 0x{:02X}",
                    self.buffer.len(),
                    command
                );
                self.buffer.clear();
                Some(Err(FirmataError::Truncated(START_SYSEX)))
            }
            None => None,
        }
    }
}

impl Iterator for FrameDecoder {
    type Item = Result<Command>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_command()
    }
}
