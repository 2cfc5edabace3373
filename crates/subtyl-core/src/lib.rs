// ============================================
// File: crates/subtyl-core/src/lib.rs
// ============================================
//! # SubtylSocket Core - Protocol & Cryptography Library
//!
//! ## Creation Reason
//! Implements the SubtylSocket authenticated key-agreement protocol:
//! a four-message handshake between an Initiator (provider) and a
//! Responder (consumer) that yields per-session symmetric keys for an
//! AEAD message channel, over any untrusted byte-oriented duplex
//! transport that preserves message boundaries.
//!
//! ## Main Functionality
//!
//! ### Handshake Module ([`handshake`])
//! - `Initiator` / `Responder` state machines
//! - Transcript-bound key confirmation in both directions
//!
//! ### Protocol Module ([`protocol`])
//! - JSON wire messages with base64 binary fields
//! - Version check and cipher/hash negotiation
//!
//! ### Crypto Module ([`crypto`])
//! - ECDH on P-256, HKDF-SHA256, HMAC-SHA-256, AES-256-GCM
//! - Checked CSPRNG draws, constant-time comparison
//! - Three-key session schedule with domain separation
//!
//! ### Channel Module ([`channel`])
//! - Post-handshake AEAD envelope encrypt/decrypt
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              subtyl-demo                            │
//! │                    │                                │
//! │         ┌──────────┴──────────┐                    │
//! │         ▼                     ▼                    │
//! │   subtyl-core  ◄──     subtyl-transport            │
//! │   You are here        │                            │
//! │         │             │                            │
//! │         └──────────┬──────────┘                    │
//! │                    ▼                               │
//! │             subtyl-common                          │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Guarantees
//! - **Key Agreement**: P-256 ECDH with fresh ephemeral keys per session
//! - **Key Confirmation**: asymmetric transcript MACs in both directions
//! - **Confidentiality / Integrity**: AES-256-GCM with 16-byte tags
//! - **Domain Separation**: distinct HKDF info strings per derived key
//!
//! Peer identity is NOT authenticated: without endpoint authentication
//! from the transport, an active attacker who can speak to both sides
//! independently can man-in-the-middle the handshake.
//!
//! ## ⚠️ Important Note for Next Developer
//! - ALL cryptographic code uses audited RustCrypto implementations
//! - NEVER implement custom crypto primitives
//! - ALL keys MUST implement Zeroize for secure cleanup
//! - Wire field names and the HKDF info encoding are interop surface
//!
//! ## Last Modified
//! v0.1.0 - Initial implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channel;
pub mod crypto;
pub mod error;
pub mod handshake;
pub mod protocol;

// Re-export commonly used items
pub use channel::SecureChannel;
pub use crypto::{DerivedKeys, EphemeralKeyPair, SessionKey, SessionKeys, SharedSecret};
pub use error::{CoreError, Result};
pub use handshake::{HandshakeOutcome, HandshakeStatus, Initiator, Responder};
pub use protocol::{Message, PROTOCOL_VERSION};
