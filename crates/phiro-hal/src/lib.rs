// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # phiro-hal
//!
//! Transport abstraction consumed by the Phiro device controller.
//!
//! The controller never opens a transport itself: pairing and port discovery
//! happen elsewhere, and an already-open, reliable, ordered byte channel is
//! handed in as a [`Connection`].
//!
//! ## Implementations
//!
//! - [`StreamConnection`]: any `Read + Write` stream (serial device file,
//!   TCP socket, pipe). Build it with [`StreamConnection::duplex`] when the
//!   stream blocks on read, so reads get their own handle.
//! - [`ConnectionDataLogger`]: in-memory double that records every sent byte
//!   and replays scripted device → host bytes

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod connection;
pub mod error;
pub mod logger;
pub mod stream;

pub use connection::{Connection, ConnectionReader, ConnectionState};
pub use error::{ConnectionError, Result};
pub use logger::{ConnectionDataLogger, LoggingConnection, LoggingReader};
pub use stream::{StreamConnection, StreamReader, TryCloneStream};
