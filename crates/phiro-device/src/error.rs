// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for the Phiro controller

use phiro_hal::ConnectionError;

/// Result type alias using DeviceError
pub type Result<T> = std::result::Result<T, DeviceError>;

/// Runtime failures of controller operations
///
/// Invalid pins or values are not represented here: they are programmer
/// errors and panic.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The transport rejected a frame
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Operation issued after `disconnect()`
    #[error("Device not connected - the connection was torn down")]
    NotConnected,

    /// Timer thread could not be spawned or joined
    #[error("Thread error: {0}")]
    ThreadError(String),
}

impl DeviceError {
    /// Check if the same call could succeed on a fresh attempt
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DeviceError::Connection(ConnectionError::Io(_))
                | DeviceError::Connection(ConnectionError::Transport(_))
        )
    }
}
