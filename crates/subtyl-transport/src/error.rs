// ============================================
// File: crates/subtyl-transport/src/error.rs
// ============================================
//! # Transport Error Types
//!
//! ## Creation Reason
//! Defines error types specific to transport adapter operations:
//! in-memory links and framed TCP streams.
//!
//! ## Main Functionality
//! - `TransportError`: Primary error enum for transport operations
//! - Error conversion from system errors
//! - Categorization of retryable vs fatal errors
//!
//! ## ⚠️ Important Note for Next Developer
//! - A send failure is reported to the owner, who destroys the peer
//!   and drops the session; there is no transport-level retry of
//!   handshake traffic
//!
//! ## Last Modified
//! v0.1.0 - Initial error definitions

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

use subtyl_common::error::CommonError;

// ============================================
// Result Type Alias
// ============================================

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

// ============================================
// TransportError
// ============================================

/// Transport adapter error types.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The link has been closed by either endpoint.
    #[error("Link is closed")]
    Closed,

    /// The in-memory queue is full.
    #[error("Link queue full (limit: {limit})")]
    QueueFull {
        /// Maximum queued messages
        limit: usize,
    },

    /// An inbound frame exceeds the size limit.
    #[error("Frame too large: {size} bytes (max {max})")]
    FrameTooLarge {
        /// Declared frame size
        size: usize,
        /// Maximum accepted size
        max: usize,
    },

    /// Failed to connect to a remote address.
    #[error("Failed to connect to {addr}: {reason}")]
    ConnectFailed {
        /// Address we tried to reach
        addr: SocketAddr,
        /// Why connecting failed
        reason: String,
    },

    /// I/O error from the system.
    #[error("I/O error: {context}")]
    Io {
        /// What was happening when the error occurred
        context: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Error from common crate.
    #[error(transparent)]
    Common(#[from] CommonError),
}

impl TransportError {
    /// Creates a `ConnectFailed` error.
    pub fn connect_failed(addr: SocketAddr, reason: impl Into<String>) -> Self {
        Self::ConnectFailed {
            addr,
            reason: reason.into(),
        }
    }

    /// Creates an `Io` error with context.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Returns `true` if this error is transient and retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::QueueFull { .. } => true,
            Self::Io { source, .. } => matches!(
                source.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}

// ============================================
// Error Conversions
// ============================================

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        Self::Io {
            context: "unspecified I/O operation".into(),
            source: err,
        }
    }
}

// ============================================
// Tests
// ============================================
