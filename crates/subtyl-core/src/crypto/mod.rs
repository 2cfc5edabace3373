// ============================================
// File: crates/subtyl-core/src/crypto/mod.rs
// ============================================
//! # Cryptography Module
//!
//! ## Creation Reason
//! Centralizes all cryptographic operations for the SubtylSocket
//! key-agreement protocol, using audited RustCrypto implementations.
//!
//! ## Main Functionality
//!
//! ### Submodules
//! - [`rng`]: Checked CSPRNG draws (session ids, nonces, IVs)
//! - [`constant_time`]: Constant-time equality comparison
//! - [`keys`]: Key types and ECDH on P-256
//! - [`kdf`]: HKDF-SHA256 (RFC 5869)
//! - [`schedule`]: Session key schedule (three domain-separated keys)
//! - [`handshake`]: Transcript-bound confirmation MACs
//! - [`aead`]: AES-256-GCM authenticated encryption
//!
//! ## Cryptographic Design
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Handshake Phase                          │
//! │  Initiator                                   Responder      │
//! │    │                                              │         │
//! │    │  P-256 Ephemeral Key + Nonce ─────────────► │         │
//! │    │ ◄───────────── P-256 Ephemeral Key + Nonce  │         │
//! │    │                                              │         │
//! │    │        P-256 ECDH (x-coordinate)             │         │
//! │    │              │                               │         │
//! │    │              ▼                               │         │
//! │    │  HKDF-SHA256 ──► enc / auth / confirm keys   │         │
//! │    │                                              │         │
//! │    │  HMAC(confirm, transcript) ───────────────► │         │
//! │    │ ◄─────────────── HMAC(confirm, transcript)  │         │
//! └─────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Channel Phase                            │
//! │                                                             │
//! │   Encryption Key + Random IV ──► AES-256-GCM ──► Envelope   │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Properties
//! - **Forward Secrecy**: New ephemeral P-256 keys per session
//! - **Key Confirmation**: Transcript-bound HMACs in both directions
//! - **Confidentiality / Integrity**: AES-256-GCM with 16-byte tags
//! - **Domain Separation**: Distinct HKDF info strings per derived key
//!
//! ## ⚠️ Important Note for Next Developer
//! - ALL implementations use RustCrypto (audited)
//! - NEVER roll your own crypto
//! - ALL sensitive keys implement Zeroize
//! - The HKDF info encoding and the MAC byte order are wire-compatible
//!   constants; changing either breaks interoperability
//!
//! ## Last Modified
//! v0.1.0 - Initial crypto implementation

pub mod aead;
pub mod constant_time;
pub mod handshake;
pub mod kdf;
pub mod keys;
pub mod rng;
pub mod schedule;

// Re-export primary types at module level
pub use aead::{Aes256GcmSuite, AeadSuite, EncryptedPayload};
pub use keys::{EphemeralKeyPair, SessionKey, SharedSecret};
pub use schedule::{derive_keys, DerivedKeys, SessionKeys};

// ============================================
// Constants
// ============================================

/// Size of an uncompressed SEC1 P-256 public key in bytes (0x04 || X || Y).
pub const P256_PUBLIC_KEY_SIZE: usize = 65;

/// Size of the ECDH shared secret (P-256 x-coordinate) in bytes.
pub const SHARED_SECRET_SIZE: usize = 32;

/// Size of an HMAC-SHA-256 tag in bytes.
pub const HMAC_TAG_SIZE: usize = 32;

/// Size of an AES-256-GCM key in bytes.
pub const AES_GCM_KEY_SIZE: usize = 32;

/// Size of an AES-256-GCM IV in bytes.
pub const AES_GCM_IV_SIZE: usize = 12;

/// Size of an AES-256-GCM authentication tag in bytes.
pub const AES_GCM_TAG_SIZE: usize = 16;

/// Maximum HKDF-SHA256 output length in bytes (255 * 32, RFC 5869).
pub const HKDF_MAX_OUTPUT: usize = 255 * 32;

/// HKDF info label for the encryption key.
pub const LABEL_ENCRYPTION: &str = "SubtylSocket-Encryption";

/// HKDF info label for the authentication key.
pub const LABEL_AUTHENTICATION: &str = "SubtylSocket-Authentication";

/// HKDF info label for the key-confirmation key.
pub const LABEL_KEY_CONFIRMATION: &str = "SubtylSocket-KeyConfirmation";

/// Version octet appended to every HKDF info string.
pub const KDF_INFO_VERSION: u8 = 1;
