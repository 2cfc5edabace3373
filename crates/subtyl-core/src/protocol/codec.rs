// ============================================
// File: crates/subtyl-core/src/protocol/codec.rs
// ============================================
//! # Protocol Codec
//!
//! ## Creation Reason
//! Provides JSON serialization and deserialization for protocol
//! messages. The transport delivers whole messages; this module turns
//! them into typed values and maps every parse failure to the
//! `MalformedMessage` error kind.
//!
//! ## Parsing Strategy
//! 1. Bytes must be valid UTF-8 JSON
//! 2. The `type` field dispatches to the message variant
//! 3. Field presence and base64 validity are enforced by serde
//!
//! ## ⚠️ Important Note for Next Developer
//! - Decode failures never reveal message contents in the error reason
//! - Unknown extra fields are tolerated; unknown `type` values are not
//!
//! ## Last Modified
//! v0.1.0 - Initial JSON codec

use crate::error::{CoreError, Result};
use crate::protocol::messages::Message;

// ============================================
// Encode / Decode
// ============================================

/// Encodes a message as UTF-8 JSON bytes.
///
/// # Errors
/// Returns `MalformedMessage` if serialization fails (practically
/// unreachable for well-formed message values).
pub fn encode_message(msg: &Message) -> Result<Vec<u8>> {
    serde_json::to_vec(msg).map_err(|e| CoreError::malformed(format!("encode failed: {e}")))
}

/// Decodes a message from UTF-8 JSON bytes.
///
/// # Errors
/// Returns `MalformedMessage` on invalid JSON, an unknown `type`, a
/// missing required field, or invalid base64 in a binary field.
pub fn decode_message(bytes: &[u8]) -> Result<Message> {
    serde_json::from_slice(bytes).map_err(|e| {
        // serde_json error displays line/column and field names only
        CoreError::malformed(format!("decode failed: {e}"))
    })
}

// ============================================
// Tests
// ============================================
