// ============================================
// File: crates/subtyl-core/src/protocol/messages.rs
// ============================================
//! # Protocol Message Definitions
//!
//! ## Creation Reason
//! Defines the structure of all wire messages exchanged between the
//! SubtylSocket Initiator (provider) and Responder (consumer).
//!
//! ## Main Functionality
//! - `Message`: tagged union over all five wire messages
//! - `HandshakeInit` / `HandshakeResponse` / `KeyConfirmRequest` /
//!   `KeyConfirmation`: the four-message handshake
//! - `EncryptedEnvelope`: post-handshake AEAD envelope
//!
//! ## Wire Format
//! Every message is a UTF-8 JSON object. The `type` field selects the
//! message; all binary fields are base64 (standard alphabet, padded).
//!
//! | `type` | Direction |
//! |--------|-----------|
//! | `handshake-init` | Initiator → Responder |
//! | `handshake-response` | Responder → Initiator |
//! | `key-confirmation-request` | Initiator → Responder |
//! | `key-confirmation` | Responder → Initiator |
//! | `encrypted-plugin-message` | either (post-handshake) |
//!
//! ## ⚠️ Important Note for Next Developer
//! - Field names are load-bearing for interoperability - DO NOT rename
//!   without a protocol version bump
//! - `providerNonce` belongs to the Initiator, `consumerNonce` to the
//!   Responder; the naming follows the embedding product's roles
//! - Unknown extra fields are tolerated on ingest
//!
//! ## Last Modified
//! v0.1.0 - Initial message definitions

use serde::{Deserialize, Serialize};

use subtyl_common::types::{Nonce, SessionId};

// ============================================
// Base64 Field Encoding
// ============================================

/// Serde adapter for binary fields carried as base64 strings.
mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BASE64.decode(&s).map_err(serde::de::Error::custom)
    }
}

// ============================================
// Message
// ============================================

/// Tagged union over every SubtylSocket wire message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    /// Initiator's opening message.
    #[serde(rename = "handshake-init")]
    HandshakeInit(HandshakeInit),

    /// Responder's reply with its key material and selection.
    #[serde(rename = "handshake-response")]
    HandshakeResponse(HandshakeResponse),

    /// Initiator's key-confirmation MAC.
    #[serde(rename = "key-confirmation-request")]
    KeyConfirmRequest(KeyConfirmRequest),

    /// Responder's key-confirmation MAC.
    #[serde(rename = "key-confirmation")]
    KeyConfirmation(KeyConfirmation),

    /// Post-handshake encrypted envelope.
    #[serde(rename = "encrypted-plugin-message")]
    EncryptedEnvelope(EncryptedEnvelope),
}

impl Message {
    /// Returns the wire `type` string of this message.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::HandshakeInit(_) => "handshake-init",
            Self::HandshakeResponse(_) => "handshake-response",
            Self::KeyConfirmRequest(_) => "key-confirmation-request",
            Self::KeyConfirmation(_) => "key-confirmation",
            Self::EncryptedEnvelope(_) => "encrypted-plugin-message",
        }
    }

    /// Checks if this is a handshake message.
    #[must_use]
    pub const fn is_handshake(&self) -> bool {
        !matches!(self, Self::EncryptedEnvelope(_))
    }
}

// ============================================
// HandshakeInit
// ============================================

/// Initiator's opening message (`handshake-init`).
///
/// Carries the protocol version, the freshly generated session id, the
/// Initiator's ephemeral public key and nonce, and the algorithm offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeInit {
    /// Protocol version (currently 1).
    pub version: u32,
    /// Session identifier generated by the Initiator.
    pub session_id: SessionId,
    /// Initiator's ephemeral public key (uncompressed SEC1, base64).
    #[serde(with = "base64_bytes")]
    pub public_key: Vec<u8>,
    /// Initiator's 32-byte handshake nonce.
    pub provider_nonce: Nonce,
    /// AEAD ciphers the Initiator supports.
    pub supported_ciphers: Vec<String>,
    /// Hash functions the Initiator supports.
    pub supported_hashes: Vec<String>,
}

// ============================================
// HandshakeResponse
// ============================================

/// Responder's reply (`handshake-response`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeResponse {
    /// Session identifier echoed from the init message.
    pub session_id: SessionId,
    /// Responder's ephemeral public key (uncompressed SEC1, base64).
    #[serde(with = "base64_bytes")]
    pub public_key: Vec<u8>,
    /// Responder's 32-byte handshake nonce.
    pub consumer_nonce: Nonce,
    /// The cipher the Responder selected from the offer.
    pub selected_cipher: String,
    /// The hash the Responder selected from the offer.
    pub selected_hash: String,
}

// ============================================
// KeyConfirmRequest
// ============================================

/// Initiator's confirmation MAC (`key-confirmation-request`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyConfirmRequest {
    /// MAC_I over the handshake transcript (base64, 32 bytes).
    #[serde(with = "base64_bytes")]
    pub confirmation_mac: Vec<u8>,
    /// Optional session id; checked against the bound session when
    /// present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
}

// ============================================
// KeyConfirmation
// ============================================

/// Responder's confirmation MAC (`key-confirmation`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyConfirmation {
    /// Session identifier.
    pub session_id: SessionId,
    /// Responder's public key, echoed from the response message.
    #[serde(with = "base64_bytes")]
    pub public_key: Vec<u8>,
    /// MAC_R over the handshake transcript (base64, 32 bytes).
    #[serde(with = "base64_bytes")]
    pub confirmation_mac: Vec<u8>,
}

// ============================================
// EncryptedEnvelope
// ============================================

/// Post-handshake AEAD envelope (`encrypted-plugin-message`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedEnvelope {
    /// AEAD algorithm name; verified on ingest.
    pub algorithm: String,
    /// The encrypted body.
    pub encrypted: EncryptedBody,
}

/// Ciphertext and its AEAD metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedBody {
    /// Ciphertext (base64).
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    /// IV and authentication tag.
    pub metadata: EnvelopeMetadata,
}

/// AEAD parameters for one envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeMetadata {
    /// 12-byte AES-GCM IV (base64).
    #[serde(with = "base64_bytes")]
    pub iv: Vec<u8>,
    /// 16-byte authentication tag (base64).
    #[serde(with = "base64_bytes")]
    pub tag: Vec<u8>,
}

// ============================================
// Tests
// ============================================
