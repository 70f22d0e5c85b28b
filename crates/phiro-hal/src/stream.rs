// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Stream-backed connection
//!
//! Wraps an already-open `Read + Write` stream. A serial device opened as a
//! file (`/dev/rfcomm0`, `/dev/ttyACM0`) or a `TcpStream` to a serial bridge
//! both fit here.

use std::fs::File;
use std::io::{self, ErrorKind, Read, Write};
use std::net::TcpStream;

use tracing::{debug, warn};

use crate::connection::{Connection, ConnectionReader, ConnectionState};
use crate::error::{ConnectionError, Result};

/// Streams that can hand out a second handle to the same channel
pub trait TryCloneStream: Read + Write + Send + Sized + 'static {
    fn try_clone_stream(&self) -> io::Result<Self>;
}

impl TryCloneStream for File {
    fn try_clone_stream(&self) -> io::Result<Self> {
        self.try_clone()
    }
}

impl TryCloneStream for TcpStream {
    fn try_clone_stream(&self) -> io::Result<Self> {
        self.try_clone()
    }
}

/// [`Connection`] over any blocking or non-blocking std stream
pub struct StreamConnection<S> {
    name: String,
    stream: Option<S>,
    reader: Option<StreamReader>,
}

/// Read half of a [`StreamConnection`] built with [`StreamConnection::duplex`]
pub struct StreamReader {
    name: String,
    stream: Box<dyn Read + Send>,
}

impl<S: TryCloneStream> StreamConnection<S> {
    /// Wrap a stream and clone off a separate handle for reads
    ///
    /// Use this for blocking streams: a read waiting on the reader handle
    /// does not hold up writes through the connection.
    ///
    /// # Errors
    /// Fails if the stream cannot be cloned
    pub fn duplex(name: impl Into<String>, stream: S) -> io::Result<Self> {
        let name = name.into();
        let read_half = stream.try_clone_stream()?;
        Ok(Self {
            reader: Some(StreamReader {
                name: name.clone(),
                stream: Box::new(read_half),
            }),
            name,
            stream: Some(stream),
        })
    }
}

impl<S: Read + Write + Send> StreamConnection<S> {
    /// Wrap an open stream
    ///
    /// # Arguments
    /// * `name` - Backend name reported by [`Connection::backend_name`]
    /// * `stream` - Open stream; ownership moves into the connection
    pub fn new(name: impl Into<String>, stream: S) -> Self {
        Self {
            name: name.into(),
            stream: Some(stream),
            reader: None,
        }
    }

    /// Give the stream back, closing the connection
    pub fn into_inner(mut self) -> Option<S> {
        self.stream.take()
    }

    fn stream_mut(&mut self) -> Result<&mut S> {
        self.stream.as_mut().ok_or(ConnectionError::Closed)
    }
}

impl<S: Read + Write + Send> Connection for StreamConnection<S> {
    fn backend_name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> ConnectionState {
        if self.stream.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        let stream = self.stream_mut()?;
        let written = stream.write_all(bytes).and_then(|()| stream.flush());
        if let Err(e) = written {
            if is_link_lost(&e) {
                warn!("[HAL] {} connection lost: {}", self.name, e);
                self.stream = None;
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn receive(&mut self, buffer: &mut [u8]) -> Result<usize> {
        read_available(self.stream_mut()?, buffer)
    }

    fn take_reader(&mut self) -> Option<Box<dyn ConnectionReader>> {
        let reader = self.reader.take()?;
        debug!("[HAL] Detached read half of {}", self.name);
        Some(Box::new(reader))
    }

    fn disconnect(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            debug!("[HAL] Closing {} connection", self.name);
            if let Err(e) = stream.flush() {
                warn!("[HAL] Flush on close failed for {}: {}", self.name, e);
                return Err(e.into());
            }
        }
        Ok(())
    }
}

impl ConnectionReader for StreamReader {
    fn receive(&mut self, buffer: &mut [u8]) -> Result<usize> {
        read_available(&mut self.stream, buffer).map_err(|e| {
            debug!("[HAL] Read on {} failed: {}", self.name, e);
            e
        })
    }
}

fn read_available(stream: &mut impl Read, buffer: &mut [u8]) -> Result<usize> {
    match stream.read(buffer) {
        Ok(n) => Ok(n),
        Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => Ok(0),
        Err(e) => Err(e.into()),
    }
}

/// Write errors after which the peer is gone for good
fn is_link_lost(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::BrokenPipe
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
            | ErrorKind::WriteZero
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_send_writes_whole_frame() {
        let mut conn = StreamConnection::new("cursor", Cursor::new(Vec::new()));
        conn.send(&[0xF4, 3, 3]).unwrap();
        conn.send(&[0xC0, 1]).unwrap();
        let inner = conn.into_inner().unwrap();
        assert_eq!(inner.into_inner(), vec![0xF4, 3, 3, 0xC0, 1]);
    }

    #[test]
    fn test_receive_reads_available_bytes() {
        let mut conn = StreamConnection::new("cursor", Cursor::new(vec![0xE0, 0x10, 0x01]));
        let mut buf = [0u8; 8];
        assert_eq!(conn.receive(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], &[0xE0, 0x10, 0x01]);
        assert_eq!(conn.receive(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_send_after_disconnect_fails() {
        let mut conn = StreamConnection::new("cursor", Cursor::new(Vec::new()));
        assert!(conn.is_connected());
        conn.disconnect().unwrap();
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert!(matches!(conn.send(&[0xE3, 0, 0]), Err(ConnectionError::Closed)));
        // second disconnect is a no-op
        conn.disconnect().unwrap();
    }

    struct BrokenPipe;

    impl Read for BrokenPipe {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Ok(0)
        }
    }

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::BrokenPipe, "peer closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_lost_peer_marks_disconnected() {
        let mut conn = StreamConnection::new("pipe", BrokenPipe);
        assert!(matches!(conn.send(&[0xE3, 0, 0]), Err(ConnectionError::Io(_))));
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert!(matches!(conn.send(&[0xE3, 0, 0]), Err(ConnectionError::Closed)));
    }

    #[test]
    fn test_plain_stream_has_no_reader() {
        let mut conn = StreamConnection::new("cursor", Cursor::new(Vec::new()));
        assert!(conn.take_reader().is_none());
    }
}
