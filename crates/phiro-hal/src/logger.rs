// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! In-memory connection double
//!
//! [`ConnectionDataLogger`] is owned by the test harness. It hands out a
//! [`LoggingConnection`] proxy to inject into the code under test and keeps
//! an append-only log of every byte the proxy sent. Each byte is logged as
//! one 32-bit message, so a three byte frame shows up as three messages.
//!
//! ```rust
//! use phiro_hal::{Connection, ConnectionDataLogger};
//!
//! let logger = ConnectionDataLogger::new();
//! let mut conn = logger.connection_proxy();
//! conn.send(&[0xE3, 0x26, 0x02]).unwrap();
//!
//! assert_eq!(logger.sent_message_count(), 3);
//! assert_eq!(logger.next_sent_message(), Some(0xE3));
//! ```

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::trace;

use crate::connection::{Connection, ConnectionReader, ConnectionState};
use crate::error::{ConnectionError, Result};

#[derive(Debug, Default)]
struct LogState {
    sent: VecDeque<u32>,
    received: VecDeque<u8>,
    state: ConnectionState,
    frames_sent: usize,
    /// Frames accepted before sends start failing
    fail_after: Option<usize>,
}

#[derive(Debug)]
struct Shared {
    log: Mutex<LogState>,
    sent_signal: Condvar,
}

/// Harness side of the logging double
#[derive(Debug, Clone)]
pub struct ConnectionDataLogger {
    shared: Arc<Shared>,
}

/// Connection side of the logging double
#[derive(Debug)]
pub struct LoggingConnection {
    shared: Arc<Shared>,
    reader_taken: bool,
}

/// Detached read half of a [`LoggingConnection`]
#[derive(Debug)]
pub struct LoggingReader {
    shared: Arc<Shared>,
}

impl Shared {
    fn receive(&self, buffer: &mut [u8]) -> Result<usize> {
        let mut log = self.log.lock();
        if log.state == ConnectionState::Disconnected {
            return Err(ConnectionError::Closed);
        }
        let n = buffer.len().min(log.received.len());
        for (slot, byte) in buffer.iter_mut().zip(log.received.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Default for ConnectionDataLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionDataLogger {
    /// Create a logger whose proxy starts out connected
    pub fn new() -> Self {
        let shared = Shared {
            log: Mutex::new(LogState {
                state: ConnectionState::Connected,
                ..LogState::default()
            }),
            sent_signal: Condvar::new(),
        };
        Self {
            shared: Arc::new(shared),
        }
    }

    /// Connection to hand to the code under test
    pub fn connection_proxy(&self) -> LoggingConnection {
        LoggingConnection {
            shared: Arc::clone(&self.shared),
            reader_taken: false,
        }
    }

    /// Pop the oldest sent message
    pub fn next_sent_message(&self) -> Option<u32> {
        self.shared.log.lock().sent.pop_front()
    }

    /// Pop the oldest sent message, waiting up to `timeout` for one to arrive
    pub fn wait_for_sent_message(&self, timeout: Duration) -> Option<u32> {
        let deadline = Instant::now() + timeout;
        let mut log = self.shared.log.lock();
        while log.sent.is_empty() {
            if self
                .shared
                .sent_signal
                .wait_until(&mut log, deadline)
                .timed_out()
            {
                break;
            }
        }
        log.sent.pop_front()
    }

    /// Pop `len` messages as one frame, `None` if fewer are logged
    pub fn next_sent_frame(&self, len: usize) -> Option<Vec<u8>> {
        let mut log = self.shared.log.lock();
        if log.sent.len() < len {
            return None;
        }
        Some(log.sent.drain(..len).map(|m| m as u8).collect())
    }

    /// Drain the whole backlog as raw bytes
    pub fn take_sent_bytes(&self) -> Vec<u8> {
        self.shared.log.lock().sent.drain(..).map(|m| m as u8).collect()
    }

    /// Snapshot of the backlog without draining it
    pub fn sent_messages(&self) -> Vec<u32> {
        self.shared.log.lock().sent.iter().copied().collect()
    }

    pub fn sent_message_count(&self) -> usize {
        self.shared.log.lock().sent.len()
    }

    /// Total frames accepted by the proxy, including drained ones
    pub fn frames_sent(&self) -> usize {
        self.shared.log.lock().frames_sent
    }

    /// Queue bytes for the proxy's `receive`, as if the device had sent them
    pub fn push_received(&self, bytes: &[u8]) {
        self.shared.log.lock().received.extend(bytes.iter().copied());
    }

    /// Let the next `frames` sends succeed, then fail every later one
    pub fn fail_sends_after(&self, frames: usize) {
        let mut log = self.shared.log.lock();
        log.fail_after = Some(log.frames_sent + frames);
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.log.lock().state
    }

    /// Close the proxy from the harness side
    pub fn disconnect(&self) {
        self.shared.log.lock().state = ConnectionState::Disconnected;
    }
}

impl Connection for LoggingConnection {
    fn backend_name(&self) -> &str {
        "logger"
    }

    fn state(&self) -> ConnectionState {
        self.shared.log.lock().state
    }

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        let mut log = self.shared.log.lock();
        if log.state == ConnectionState::Disconnected {
            return Err(ConnectionError::Closed);
        }
        if log.fail_after.is_some_and(|limit| log.frames_sent >= limit) {
            return Err(ConnectionError::Transport("injected send failure".to_string()));
        }
        trace!("[LOGGER] sent {:02X?}", bytes);
        log.sent.extend(bytes.iter().map(|b| u32::from(*b)));
        log.frames_sent += 1;
        drop(log);
        self.shared.sent_signal.notify_all();
        Ok(())
    }

    fn receive(&mut self, buffer: &mut [u8]) -> Result<usize> {
        self.shared.receive(buffer)
    }

    fn take_reader(&mut self) -> Option<Box<dyn ConnectionReader>> {
        if self.reader_taken {
            return None;
        }
        self.reader_taken = true;
        Some(Box::new(LoggingReader {
            shared: Arc::clone(&self.shared),
        }))
    }

    fn disconnect(&mut self) -> Result<()> {
        self.shared.log.lock().state = ConnectionState::Disconnected;
        Ok(())
    }
}

impl ConnectionReader for LoggingReader {
    fn receive(&mut self, buffer: &mut [u8]) -> Result<usize> {
        self.shared.receive(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_logs_each_byte_as_message() {
        let logger = ConnectionDataLogger::new();
        let mut conn = logger.connection_proxy();
        conn.send(&[0xF4, 3, 3]).unwrap();

        assert_eq!(logger.sent_messages(), vec![0xF4, 3, 3]);
        assert_eq!(logger.next_sent_message(), Some(0xF4));
        assert_eq!(logger.next_sent_message(), Some(3));
        assert_eq!(logger.next_sent_message(), Some(3));
        assert_eq!(logger.next_sent_message(), None);
        assert_eq!(logger.frames_sent(), 1);
    }

    #[test]
    fn test_next_sent_frame_requires_full_frame() {
        let logger = ConnectionDataLogger::new();
        let mut conn = logger.connection_proxy();
        conn.send(&[0xC0, 1]).unwrap();
        assert_eq!(logger.next_sent_frame(3), None);
        assert_eq!(logger.next_sent_frame(2), Some(vec![0xC0, 1]));
    }

    #[test]
    fn test_replays_received_bytes() {
        let logger = ConnectionDataLogger::new();
        let mut conn = logger.connection_proxy();
        logger.push_received(&[0xE4, 0x10, 0x02, 0xE5]);

        let mut buf = [0u8; 3];
        assert_eq!(conn.receive(&mut buf).unwrap(), 3);
        assert_eq!(buf, [0xE4, 0x10, 0x02]);
        assert_eq!(conn.receive(&mut buf).unwrap(), 1);
        assert_eq!(conn.receive(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_reader_shares_received_bytes() {
        let logger = ConnectionDataLogger::new();
        let mut conn = logger.connection_proxy();
        let mut reader = conn.take_reader().unwrap();
        assert!(conn.take_reader().is_none());

        logger.push_received(&[0xE1, 0x10, 0x02]);
        let mut buf = [0u8; 4];
        assert_eq!(reader.receive(&mut buf).unwrap(), 3);

        logger.disconnect();
        assert!(matches!(reader.receive(&mut buf), Err(ConnectionError::Closed)));
    }

    #[test]
    fn test_disconnect_blocks_further_sends() {
        let logger = ConnectionDataLogger::new();
        let mut conn = logger.connection_proxy();
        conn.disconnect().unwrap();
        assert_eq!(logger.state(), ConnectionState::Disconnected);
        assert!(matches!(conn.send(&[0xE3, 0, 0]), Err(ConnectionError::Closed)));
        assert_eq!(logger.sent_message_count(), 0);
    }

    #[test]
    fn test_injected_failure() {
        let logger = ConnectionDataLogger::new();
        let mut conn = logger.connection_proxy();
        logger.fail_sends_after(1);
        conn.send(&[0xE3, 0, 0]).unwrap();
        assert!(matches!(
            conn.send(&[0xE3, 0, 0]),
            Err(ConnectionError::Transport(_))
        ));
        assert_eq!(logger.frames_sent(), 1);
    }

    #[test]
    fn test_wait_for_sent_message_from_other_thread() {
        let logger = ConnectionDataLogger::new();
        let mut conn = logger.connection_proxy();
        let writer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            conn.send(&[0xE3]).unwrap();
        });
        assert_eq!(
            logger.wait_for_sent_message(Duration::from_secs(2)),
            Some(0xE3)
        );
        writer.join().unwrap();
        assert_eq!(logger.wait_for_sent_message(Duration::from_millis(10)), None);
    }
}
