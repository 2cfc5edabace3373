// ============================================
// File: crates/subtyl-transport/src/framed.rs
// ============================================
//! # Framed TCP Link
//!
//! ## Creation Reason
//! TCP is a byte stream; the protocol core assumes the transport
//! delivers whole messages. This adapter supplies the boundaries with
//! a 4-byte big-endian length prefix per message.
//!
//! ## Wire Format
//! ```text
//! ┌───────────────────────┬──────────────────────────────┐
//! │ length (4 bytes, BE)  │ message (length bytes, JSON) │
//! └───────────────────────┴──────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Frames above `MAX_FRAME_SIZE` are rejected before allocation
//! - `recv` holds the read half; `send` the write half - full duplex
//!   use from two threads is fine, two concurrent readers are not
//!
//! ## Last Modified
//! v0.1.0 - Initial framed TCP adapter

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::MessageLink;

// ============================================
// Constants
// ============================================

/// Maximum accepted frame size (1 MiB).
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

// ============================================
// FramedTcpLink
// ============================================

/// A `MessageLink` over a TCP stream with length-prefixed frames.
pub struct FramedTcpLink {
    reader: Mutex<TcpStream>,
    writer: Mutex<TcpStream>,
    open: AtomicBool,
    peer: SocketAddr,
}

impl FramedTcpLink {
    /// Connects to a remote endpoint.
    ///
    /// # Errors
    /// Returns `ConnectFailed` if the connection cannot be established.
    pub fn connect(addr: SocketAddr) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| TransportError::connect_failed(addr, e.to_string()))?;
        Self::from_stream(stream)
    }

    /// Wraps an accepted TCP stream.
    ///
    /// # Errors
    /// Returns an I/O error if the stream cannot be duplicated for
    /// full-duplex use.
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        stream
            .set_nodelay(true)
            .map_err(|e| TransportError::io("set_nodelay", e))?;
        let peer = stream
            .peer_addr()
            .map_err(|e| TransportError::io("peer_addr", e))?;
        let reader = stream
            .try_clone()
            .map_err(|e| TransportError::io("clone stream", e))?;

        debug!(%peer, "framed TCP link established");

        Ok(Self {
            reader: Mutex::new(reader),
            writer: Mutex::new(stream),
            open: AtomicBool::new(true),
            peer,
        })
    }

    /// The remote endpoint's address.
    #[must_use]
    pub const fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl MessageLink for FramedTcpLink {
    fn send(&self, msg: &[u8]) -> Result<()> {
        if !self.is_open() {
            return Err(TransportError::Closed);
        }
        if msg.len() > MAX_FRAME_SIZE {
            return Err(TransportError::FrameTooLarge {
                size: msg.len(),
                max: MAX_FRAME_SIZE,
            });
        }

        let len = u32::try_from(msg.len())
            .map_err(|_| TransportError::FrameTooLarge {
                size: msg.len(),
                max: MAX_FRAME_SIZE,
            })?
            .to_be_bytes();

        let mut writer = self.writer.lock();
        let written = write_frame(&mut writer, &len, msg);
        drop(writer);

        written.map_err(|e| {
            self.open.store(false, Ordering::Release);
            TransportError::io("frame write", e)
        })
    }

    fn recv(&self) -> Result<Vec<u8>> {
        if !self.is_open() {
            return Err(TransportError::Closed);
        }

        let mut reader = self.reader.lock();

        let mut len_bytes = [0u8; 4];
        reader.read_exact(&mut len_bytes).map_err(|e| {
            self.open.store(false, Ordering::Release);
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                TransportError::Closed
            } else {
                TransportError::io("frame length read", e)
            }
        })?;

        let len = u32::from_be_bytes(len_bytes) as usize;
        if len > MAX_FRAME_SIZE {
            self.open.store(false, Ordering::Release);
            return Err(TransportError::FrameTooLarge {
                size: len,
                max: MAX_FRAME_SIZE,
            });
        }

        let mut msg = vec![0u8; len];
        reader.read_exact(&mut msg).map_err(|e| {
            self.open.store(false, Ordering::Release);
            TransportError::io("frame body read", e)
        })?;

        Ok(msg)
    }

    fn try_recv(&self) -> Result<Option<Vec<u8>>> {
        // A non-blocking peek over a stream socket needs platform
        // plumbing the demo does not require; callers use recv().
        if self.is_open() {
            Ok(None)
        } else {
            Err(TransportError::Closed)
        }
    }

    fn close(&self) {
        if self.open.swap(false, Ordering::AcqRel) {
            let writer = self.writer.lock();
            let _ = writer.shutdown(std::net::Shutdown::Both);
            debug!(peer = %self.peer, "framed TCP link closed");
        }
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}

impl Drop for FramedTcpLink {
    fn drop(&mut self) {
        self.close();
    }
}

/// Writes one length-prefixed frame.
fn write_frame(stream: &mut TcpStream, len_prefix: &[u8; 4], msg: &[u8]) -> std::io::Result<()> {
    stream.write_all(len_prefix)?;
    stream.write_all(msg)?;
    stream.flush()
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    fn link_pair() -> (FramedTcpLink, FramedTcpLink) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let client_thread = std::thread::spawn(move || FramedTcpLink::connect(addr).unwrap());
        let (server_stream, _) = listener.accept().unwrap();
        let server = FramedTcpLink::from_stream(server_stream).unwrap();
        let client = client_thread.join().unwrap();

        (client, server)
    }

    #[test]
    fn test_frame_roundtrip() {
        let (client, server) = link_pair();

        client.send(b"hello over tcp").unwrap();
        assert_eq!(server.recv().unwrap(), b"hello over tcp");

        server.send(b"and back").unwrap();
        assert_eq!(client.recv().unwrap(), b"and back");
    }

    #[test]
    fn test_multiple_frames_preserve_boundaries() {
        let (client, server) = link_pair();

        client.send(b"one").unwrap();
        client.send(b"two-two").unwrap();
        client.send(b"").unwrap();

        assert_eq!(server.recv().unwrap(), b"one");
        assert_eq!(server.recv().unwrap(), b"two-two");
        assert_eq!(server.recv().unwrap(), b"");
    }

    #[test]
    fn test_oversized_send_rejected() {
        let (client, _server) = link_pair();

        let huge = vec![0u8; MAX_FRAME_SIZE + 1];
        let result = client.send(&huge);
        assert!(matches!(result, Err(TransportError::FrameTooLarge { .. })));
    }

    #[test]
    fn test_peer_close_surfaces_as_closed() {
        let (client, server) = link_pair();

        client.close();
        let result = server.recv();
        assert!(result.is_err());
    }
}
