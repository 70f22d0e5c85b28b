// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for Phiro connections

/// Result type alias using ConnectionError
pub type Result<T> = std::result::Result<T, ConnectionError>;

/// Transport-level failures
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Underlying stream I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel was already torn down
    #[error("Connection is closed")]
    Closed,

    /// Transport-specific failure
    #[error("Transport error: {0}")]
    Transport(String),
}
