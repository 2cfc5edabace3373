// ============================================
// File: crates/subtyl-common/src/types.rs
// ============================================
//! # Core Type Definitions
//!
//! ## Creation Reason
//! Centralizes the identifier types bound into every SubtylSocket
//! handshake message, ensuring type safety and a single wire
//! representation (standard base64, padded).
//!
//! ## Main Functionality
//! - `SessionId`: Unique identifier for a handshake session (16 bytes)
//! - `Nonce`: Per-peer single-use random value (32 bytes)
//! - Base64 serialization for human-readable formats
//!
//! ## Main Logical Flow
//! 1. Values are generated once per session by `subtyl-core::crypto::rng`
//! 2. Bound into every post-init message; mismatch is fatal
//! 3. Serialized as base64 strings for the JSON wire format
//! 4. Securely zeroed on drop
//!
//! ## ⚠️ Important Note for Next Developer
//! - Generation does NOT live here: all random draws go through the
//!   checked CSPRNG path in subtyl-core so a broken source is detected
//! - Both types zeroize on drop and therefore do not implement `Copy`
//! - Maintain backward-compatible serialization formats
//!
//! ## Last Modified
//! v0.1.0 - SessionId and Nonce definitions

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

// ============================================
// Constants
// ============================================

/// Size of a `SessionId` in bytes.
pub const SESSION_ID_SIZE: usize = 16;

/// Size of a handshake `Nonce` in bytes.
pub const NONCE_SIZE: usize = 32;

// ============================================
// Parse Error Type
// ============================================

/// Error type for identifier parsing failures.
#[derive(Debug, Clone)]
pub enum IdentifierError {
    /// Base64 decoding failed.
    InvalidBase64(String),
    /// Decoded bytes have the wrong length.
    InvalidLength {
        /// Expected length in bytes
        expected: usize,
        /// Actual length received
        actual: usize,
    },
}

impl fmt::Display for IdentifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBase64(msg) => write!(f, "Invalid base64: {}", msg),
            Self::InvalidLength { expected, actual } => {
                write!(f, "Invalid length: expected {}, got {}", expected, actual)
            }
        }
    }
}

impl std::error::Error for IdentifierError {}

// ============================================
// SessionId
// ============================================

/// Unique identifier for a handshake session.
///
/// # Security Properties
/// - Generated by the Initiator from the checked OS CSPRNG
/// - Fixed 16-byte size (128 bits of entropy)
/// - Zeroed on drop
/// - Immutable once created; bound into every post-init message
///
/// # Wire Format
/// Base64 string (standard alphabet, padded) inside the JSON messages.
///
/// # Example
/// ```
/// use subtyl_common::types::SessionId;
///
/// let session_id = SessionId::from_array([0x42u8; 16]);
/// let bytes = session_id.as_bytes();
/// let restored = SessionId::from_bytes(bytes).unwrap();
///
/// assert_eq!(session_id, restored);
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Zeroize, ZeroizeOnDrop)]
pub struct SessionId([u8; SESSION_ID_SIZE]);

impl SessionId {
    /// Creates a `SessionId` from an owned 16-byte array.
    #[must_use]
    pub const fn from_array(bytes: [u8; SESSION_ID_SIZE]) -> Self {
        Self(bytes)
    }

    /// Creates a new `SessionId` from raw bytes.
    ///
    /// # Returns
    /// - `Some(SessionId)` if bytes length is correct
    /// - `None` if bytes length is not 16
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != SESSION_ID_SIZE {
            return None;
        }
        let mut id = [0u8; SESSION_ID_SIZE];
        id.copy_from_slice(bytes);
        Some(Self(id))
    }

    /// Returns the raw bytes of the session ID.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; SESSION_ID_SIZE] {
        &self.0
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only show first 4 bytes in debug output for privacy
        write!(
            f,
            "SessionId({:02x}{:02x}{:02x}{:02x}...)",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", BASE64.encode(self.0))
    }
}

impl FromStr for SessionId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = BASE64
            .decode(s)
            .map_err(|e| IdentifierError::InvalidBase64(e.to_string()))?;

        Self::from_bytes(&bytes).ok_or(IdentifierError::InvalidLength {
            expected: SESSION_ID_SIZE,
            actual: bytes.len(),
        })
    }
}

impl Serialize for SessionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&BASE64.encode(self.0))
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            Self::from_bytes(&bytes)
                .ok_or_else(|| serde::de::Error::invalid_length(bytes.len(), &"16 bytes"))
        }
    }
}

impl AsRef<[u8]> for SessionId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// ============================================
// Nonce
// ============================================

/// Per-peer single-use random value mixed into the key schedule.
///
/// # Security Properties
/// - 32 bytes (256 bits) drawn once per peer per session
/// - Never reused; the pair (initiator nonce, responder nonce) forms the
///   HKDF salt, so every session derives fresh keys
/// - Zeroed on drop
///
/// Distinct from the 12-byte AEAD IV used by the encrypted channel.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Nonce([u8; NONCE_SIZE]);

impl Nonce {
    /// Creates a `Nonce` from an owned 32-byte array.
    #[must_use]
    pub const fn from_array(bytes: [u8; NONCE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Creates a new `Nonce` from raw bytes.
    ///
    /// # Returns
    /// - `Some(Nonce)` if bytes length is correct
    /// - `None` if bytes length is not 32
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != NONCE_SIZE {
            return None;
        }
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(bytes);
        Some(Self(nonce))
    }

    /// Returns the raw bytes of the nonce.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Nonce({:02x}{:02x}{:02x}{:02x}...)",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", BASE64.encode(self.0))
    }
}

impl FromStr for Nonce {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = BASE64
            .decode(s)
            .map_err(|e| IdentifierError::InvalidBase64(e.to_string()))?;

        Self::from_bytes(&bytes).ok_or(IdentifierError::InvalidLength {
            expected: NONCE_SIZE,
            actual: bytes.len(),
        })
    }
}

impl Serialize for Nonce {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&BASE64.encode(self.0))
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Nonce {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            Self::from_bytes(&bytes)
                .ok_or_else(|| serde::de::Error::invalid_length(bytes.len(), &"32 bytes"))
        }
    }
}

impl AsRef<[u8]> for Nonce {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_roundtrip() {
        let original = SessionId::from_array([0xA7u8; 16]);

        // Byte roundtrip
        let bytes = original.as_bytes();
        let restored = SessionId::from_bytes(bytes).unwrap();
        assert_eq!(original, restored);

        // String roundtrip
        let s = original.to_string();
        let parsed: SessionId = s.parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_session_id_invalid_length() {
        let short = [0u8; 8];
        assert!(SessionId::from_bytes(&short).is_none());

        let long = [0u8; 32];
        assert!(SessionId::from_bytes(&long).is_none());
    }

    #[test]
    fn test_session_id_invalid_base64() {
        let result: Result<SessionId, _> = "not valid base64!!".parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_nonce_roundtrip() {
        let original = Nonce::from_array([0x5Cu8; 32]);

        let restored = Nonce::from_bytes(original.as_bytes()).unwrap();
        assert_eq!(original, restored);

        let s = original.to_string();
        let parsed: Nonce = s.parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_nonce_invalid_length() {
        assert!(Nonce::from_bytes(&[0u8; 16]).is_none());
        assert!(Nonce::from_bytes(&[0u8; 64]).is_none());
    }

    #[test]
    fn test_session_id_json_serialization() {
        let original = SessionId::from_array([0x11u8; 16]);
        let json = serde_json::to_string(&original).unwrap();
        let restored: SessionId = serde_json::from_str(&json).unwrap();
        assert_eq!(original, restored);
    }

    #[test]
    fn test_nonce_json_serialization() {
        let original = Nonce::from_array([0x22u8; 32]);
        let json = serde_json::to_string(&original).unwrap();

        // JSON form is a base64 string with standard padding
        assert!(json.starts_with('"') && json.ends_with('"'));
        let restored: Nonce = serde_json::from_str(&json).unwrap();
        assert_eq!(original, restored);
    }

    #[test]
    fn test_identifier_error_display() {
        let err = IdentifierError::InvalidLength {
            expected: 16,
            actual: 8,
        };
        assert!(err.to_string().contains("16"));
        assert!(err.to_string().contains("8"));
    }
}
