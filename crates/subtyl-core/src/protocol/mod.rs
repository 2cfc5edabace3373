// ============================================
// File: crates/subtyl-core/src/protocol/mod.rs
// ============================================
//! # Protocol Module
//!
//! ## Creation Reason
//! Defines the wire protocol for the SubtylSocket key-agreement
//! handshake and its post-handshake envelope.
//!
//! ## Main Functionality
//!
//! ### Submodules
//! - [`messages`]: Protocol message structures
//! - [`codec`]: JSON serialization/deserialization
//! - [`version`]: Protocol versioning and algorithm negotiation
//!
//! ## Protocol Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Handshake Phase                          │
//! │                                                             │
//! │  Initiator ───────── handshake-init ──────────► Responder  │
//! │  Initiator ◄──────── handshake-response ─────── Responder  │
//! │  Initiator ───── key-confirmation-request ────► Responder  │
//! │  Initiator ◄──────── key-confirmation ───────── Responder  │
//! │                                                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    Channel Phase                            │
//! │                                                             │
//! │  Initiator ═════ encrypted-plugin-message ═════ Responder  │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format Principles
//! - UTF-8 JSON objects, one per transport message
//! - Binary fields as standard base64 with padding
//! - `type` field in every message for dispatch
//!
//! ## ⚠️ Important Note for Next Developer
//! - ANY wire change requires a protocol version bump
//! - Message boundaries come from the transport, not from this layer
//!
//! ## Last Modified
//! v0.1.0 - Initial protocol definitions

pub mod codec;
pub mod messages;
pub mod version;

// Re-export primary types
pub use codec::{decode_message, encode_message};
pub use messages::{
    EncryptedBody, EncryptedEnvelope, EnvelopeMetadata, HandshakeInit, HandshakeResponse,
    KeyConfirmRequest, KeyConfirmation, Message,
};
pub use version::{PROTOCOL_VERSION, SUPPORTED_CIPHERS, SUPPORTED_HASHES};
