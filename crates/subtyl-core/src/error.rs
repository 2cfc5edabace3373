// ============================================
// File: crates/subtyl-core/src/error.rs
// ============================================
//! # Core Error Types
//!
//! ## Creation Reason
//! Defines the stable error taxonomy for protocol and cryptographic
//! operations in the SubtylSocket core crate. Each kind is surfaced to
//! the owner by name; every handshake error also drives the state
//! machine to `Failed`.
//!
//! ## Main Functionality
//! - `CoreError`: Primary error enum for core operations
//! - Convenience constructors and classification helpers
//!
//! ## Error Categories
//! 1. **Protocol Errors**: Message parsing, state, version, negotiation
//! 2. **Crypto Errors**: Key exchange, key derivation, confirmation, AEAD
//!
//! ## ⚠️ Important Note for Next Developer
//! - NEVER include key material in error messages
//! - The taxonomy is part of the external contract - do not rename
//!   variants without a protocol version bump
//! - `KeyConfirmationFailed` is always surfaced as-is; it indicates a
//!   possible man-in-the-middle and warrants monitoring
//!
//! ## Last Modified
//! v0.1.0 - Initial error definitions

use thiserror::Error;

// ============================================
// Result Type Alias
// ============================================

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

// ============================================
// CoreError
// ============================================

/// Core error taxonomy for handshake and channel operations.
///
/// # Security Note
/// Error messages are designed to be informative for debugging
/// without revealing sensitive information like key material.
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    // ========================================
    // Protocol Errors
    // ========================================
    /// JSON parse failure or missing required field.
    #[error("Malformed message: {reason}")]
    MalformedMessage {
        /// What's wrong with the message
        reason: String,
    },

    /// Message type does not match the expected next type for the state.
    #[error("Unexpected message: expected {expected}, got {got}")]
    UnexpectedMessage {
        /// Message type the state machine was waiting for
        expected: String,
        /// Message type actually received
        got: String,
    },

    /// Protocol version mismatch.
    #[error("Unsupported protocol version: {got}, expected {expected}")]
    UnsupportedVersion {
        /// Version received
        got: u32,
        /// Version expected
        expected: u32,
    },

    /// No common cipher or hash between the peers.
    #[error("Unsupported algorithm: {reason}")]
    UnsupportedAlgorithm {
        /// Which negotiation failed
        reason: String,
    },

    /// Bound session identifier disagrees.
    #[error("Session identifier mismatch")]
    SessionIdMismatch,

    // ========================================
    // Cryptographic Errors
    // ========================================
    /// Peer's public key rejected by the ECDH primitive.
    #[error("Invalid peer public key")]
    InvalidPublicKey,

    /// Confirmation MAC mismatch under constant-time comparison.
    ///
    /// Treated as indicating an active man-in-the-middle.
    #[error("Key confirmation failed")]
    KeyConfirmationFailed,

    /// HKDF expand output length exceeds 255 * 32 bytes.
    #[error("Requested key material too large: {requested} bytes (max {max})")]
    LengthTooLarge {
        /// Requested output length
        requested: usize,
        /// Maximum permitted length
        max: usize,
    },

    /// Random generator produced an all-0 or all-0xFF buffer.
    #[error("Insufficient entropy from random source")]
    InsufficientEntropy,

    /// Post-handshake decrypt failure (authentication tag rejected).
    #[error("AEAD authentication tag mismatch")]
    AeadTagMismatch,
}

impl CoreError {
    // ========================================
    // Convenience Constructors
    // ========================================

    /// Creates a `MalformedMessage` error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedMessage {
            reason: reason.into(),
        }
    }

    /// Creates an `UnexpectedMessage` error.
    pub fn unexpected(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::UnexpectedMessage {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Creates an `UnsupportedAlgorithm` error.
    pub fn unsupported_algorithm(reason: impl Into<String>) -> Self {
        Self::UnsupportedAlgorithm {
            reason: reason.into(),
        }
    }

    // ========================================
    // Error Classification
    // ========================================

    /// Returns `true` if this is a protocol error.
    ///
    /// Protocol errors indicate malformed, out-of-order or
    /// non-negotiable messages.
    #[must_use]
    pub const fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedMessage { .. }
                | Self::UnexpectedMessage { .. }
                | Self::UnsupportedVersion { .. }
                | Self::UnsupportedAlgorithm { .. }
                | Self::SessionIdMismatch
        )
    }

    /// Returns `true` if this is a cryptographic error.
    #[must_use]
    pub const fn is_crypto_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPublicKey
                | Self::KeyConfirmationFailed
                | Self::LengthTooLarge { .. }
                | Self::InsufficientEntropy
                | Self::AeadTagMismatch
        )
    }

    /// Returns `true` if this error might indicate an attack.
    ///
    /// These errors warrant additional logging/monitoring.
    #[must_use]
    pub const fn is_suspicious(&self) -> bool {
        matches!(
            self,
            Self::KeyConfirmationFailed | Self::SessionIdMismatch | Self::AeadTagMismatch
        )
    }
}

// ============================================
// Tests
// ============================================
