// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Shared, locked access to the connection
//!
//! The controller and the tone timer thread both write through one [`Link`]
//! behind a single mutex. Holding the guard for a whole frame sequence keeps
//! multi-frame operations contiguous on the wire.

use std::sync::Arc;

use parking_lot::Mutex;
use phiro_hal::{Connection, ConnectionState};
use tracing::trace;

use crate::error::{DeviceError, Result};

pub(crate) type SharedLink = Arc<Mutex<Link>>;

pub(crate) struct Link {
    connection: Box<dyn Connection>,
    /// Cleared by a host-side `disconnect()`
    open: bool,
}

impl Link {
    pub(crate) fn shared(connection: Box<dyn Connection>) -> SharedLink {
        Arc::new(Mutex::new(Link {
            connection,
            open: true,
        }))
    }

    /// Disconnected once either side closed the channel
    pub(crate) fn state(&self) -> ConnectionState {
        if self.open {
            self.connection.state()
        } else {
            ConnectionState::Disconnected
        }
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Whether the host has not called `disconnect()` yet
    pub(crate) fn is_open(&self) -> bool {
        self.open
    }

    pub(crate) fn send_frame(&mut self, frame: &[u8]) -> Result<()> {
        if !self.is_connected() {
            return Err(DeviceError::NotConnected);
        }
        trace!("[PHIRO] -> {:02X?}", frame);
        self.connection.send(frame)?;
        Ok(())
    }

    pub(crate) fn receive(&mut self, buffer: &mut [u8]) -> Result<usize> {
        if !self.is_connected() {
            return Err(DeviceError::NotConnected);
        }
        Ok(self.connection.receive(buffer)?)
    }

    /// Close from the host side and tear down the transport
    ///
    /// The link is closed even if tearing down the transport fails, so
    /// nothing is written afterwards either way.
    pub(crate) fn disconnect(&mut self) -> Result<()> {
        self.open = false;
        self.connection.disconnect()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phiro_hal::ConnectionDataLogger;

    #[test]
    fn test_state_follows_remote_close() {
        let logger = ConnectionDataLogger::new();
        let link = Link::shared(Box::new(logger.connection_proxy()));
        assert!(link.lock().is_connected());

        logger.disconnect();
        let mut link = link.lock();
        assert_eq!(link.state(), ConnectionState::Disconnected);
        assert!(link.is_open());
        assert!(matches!(
            link.send_frame(&[0xE3, 0, 0]),
            Err(DeviceError::NotConnected)
        ));
    }
}
