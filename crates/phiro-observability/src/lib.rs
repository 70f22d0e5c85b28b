// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # phiro-observability
//!
//! Logging setup shared by the Phiro tools, with per-crate debug flag support.
//!
//! Library crates only emit `tracing` events; binaries call [`init_logging`]
//! once at startup.
//!
//! ## Features
//! - `file-logging`: JSON log files with daily rotation in a per-run folder

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Known Phiro crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "phiro-firmata",
    "phiro-hal",
    "phiro-device",
    "phiro-config",
];
