// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;

/// Connection status of a byte channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected,
}

/// Byte channel to the robot
///
/// Implementations must be `Send`: the tone stop frame is written from a
/// timer thread. Callers serialize access themselves (one writer lock per
/// channel), so implementations do not need interior locking.
pub trait Connection: Send {
    /// Transport backend name (e.g., "serial", "tcp", "logger")
    fn backend_name(&self) -> &str;

    /// Current connection state
    fn state(&self) -> ConnectionState;

    /// Write a complete frame
    ///
    /// The frame must reach the transport as one contiguous unit.
    fn send(&mut self, bytes: &[u8]) -> Result<()>;

    /// Read available bytes into `buffer`
    ///
    /// # Returns
    /// Number of bytes read; `0` when nothing is available
    fn receive(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Tear down the channel
    ///
    /// Calling this on an already closed channel is a no-op.
    fn disconnect(&mut self) -> Result<()>;

    /// Detach an independent read half
    ///
    /// Backends whose `receive` may block should hand one out, so a pending
    /// read never holds up writers. `None` means reads go through `receive`.
    /// Called at most once, before the first read.
    fn take_reader(&mut self) -> Option<Box<dyn ConnectionReader>> {
        None
    }

    fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }
}

/// Read half detached from a [`Connection`]
pub trait ConnectionReader: Send {
    /// Read available bytes into `buffer`
    ///
    /// # Returns
    /// Number of bytes read; `0` when nothing is available
    fn receive(&mut self, buffer: &mut [u8]) -> Result<usize>;
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    fn backend_name(&self) -> &str {
        (**self).backend_name()
    }

    fn state(&self) -> ConnectionState {
        (**self).state()
    }

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).send(bytes)
    }

    fn receive(&mut self, buffer: &mut [u8]) -> Result<usize> {
        (**self).receive(buffer)
    }

    fn disconnect(&mut self) -> Result<()> {
        (**self).disconnect()
    }

    fn take_reader(&mut self) -> Option<Box<dyn ConnectionReader>> {
        (**self).take_reader()
    }
}
