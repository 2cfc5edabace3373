// ============================================
// File: crates/subtyl-core/src/crypto/keys.rs
// ============================================
//! # Cryptographic Key Types
//!
//! ## Creation Reason
//! Defines key types used throughout the SubtylSocket handshake with
//! proper security properties (Zeroize on drop, constant-time
//! comparison, redacted Debug output).
//!
//! ## Main Functionality
//! - `EphemeralKeyPair`: Per-session P-256 key exchange keys
//! - `SharedSecret`: 32-byte ECDH output (x-coordinate)
//! - `SessionKey`: Derived 32-byte symmetric key
//!
//! ## Key Lifecycle
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  EphemeralKeyPair (Per-session)                            │
//! │  ├─ Generated fresh for each handshake                     │
//! │  ├─ Public half serialized as uncompressed SEC1 (65 B)     │
//! │  └─ Consumed by the ECDH exchange                          │
//! │                                                            │
//! │  SharedSecret (Transient)                                  │
//! │  ├─ x-coordinate of the ECDH point                         │
//! │  ├─ Lives only long enough to feed the key schedule        │
//! │  └─ Zeroed on drop                                         │
//! │                                                            │
//! │  SessionKey (Per-session)                                  │
//! │  ├─ Output of the key schedule (encryption/auth/confirm)   │
//! │  └─ Zeroed on drop                                         │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - ALL key types MUST implement Zeroize
//! - Private keys should NEVER be logged or serialized
//! - Point validation (including the identity point) is delegated to
//!   the p256 crate; a rejected point surfaces as `InvalidPublicKey`
//!
//! ## Last Modified
//! v0.1.0 - Initial key type definitions

use std::fmt;

use p256::ecdh::EphemeralSecret;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::PublicKey;
use rand::rngs::OsRng;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{P256_PUBLIC_KEY_SIZE, SHARED_SECRET_SIZE};
use crate::crypto::constant_time::ct_eq;
use crate::error::{CoreError, Result};

// ============================================
// EphemeralKeyPair (P-256)
// ============================================

/// Ephemeral P-256 key pair for Diffie-Hellman key exchange.
///
/// # Purpose
/// Generated fresh for each handshake to provide forward secrecy.
/// After key exchange, the private key is consumed and cannot be reused.
///
/// # Security
/// - Private key never leaves this type
/// - Single-use design (consumed by `exchange`)
///
/// # Example
/// ```
/// use subtyl_core::crypto::EphemeralKeyPair;
///
/// let alice = EphemeralKeyPair::generate();
/// let bob = EphemeralKeyPair::generate();
///
/// let alice_public = alice.public_key_bytes();
/// let bob_public = bob.public_key_bytes();
///
/// // Exchange keys (consumes private keys)
/// let alice_shared = alice.exchange(&bob_public).unwrap();
/// let bob_shared = bob.exchange(&alice_public).unwrap();
///
/// assert_eq!(alice_shared.as_bytes(), bob_shared.as_bytes());
/// ```
pub struct EphemeralKeyPair {
    secret: EphemeralSecret,
    public: PublicKey,
}

impl EphemeralKeyPair {
    /// Generates a new random ephemeral key pair.
    ///
    /// Uses the operating system's secure random number generator;
    /// the p256 crate rejects degenerate scalars internally.
    #[must_use]
    pub fn generate() -> Self {
        let secret = EphemeralSecret::random(&mut OsRng);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Returns the public key in uncompressed SEC1 form (65 bytes).
    #[must_use]
    pub fn public_key_bytes(&self) -> [u8; P256_PUBLIC_KEY_SIZE] {
        encode_public_key(&self.public)
    }

    /// Performs key exchange with a peer's SEC1-encoded public key.
    ///
    /// # Consumes Self
    /// This method consumes the key pair, ensuring the private key
    /// cannot be reused (single-use ephemeral keys).
    ///
    /// # Errors
    /// Returns `InvalidPublicKey` if the peer bytes do not decode to a
    /// valid point on the curve (the identity point is rejected by the
    /// underlying primitive).
    pub fn exchange(self, peer_public_sec1: &[u8]) -> Result<SharedSecret> {
        let peer_key = decode_public_key(peer_public_sec1)?;
        let shared = self.secret.diffie_hellman(&peer_key);

        let mut bytes = [0u8; SHARED_SECRET_SIZE];
        bytes.copy_from_slice(shared.raw_secret_bytes().as_slice());
        Ok(SharedSecret(bytes))
    }
}

impl fmt::Debug for EphemeralKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.public_key_bytes();
        f.debug_struct("EphemeralKeyPair")
            .field(
                "public",
                &format_args!(
                    "{:02x}{:02x}{:02x}{:02x}...",
                    bytes[0], bytes[1], bytes[2], bytes[3]
                ),
            )
            .finish_non_exhaustive()
    }
}

/// Encodes a P-256 public key as uncompressed SEC1 bytes.
#[must_use]
pub fn encode_public_key(key: &PublicKey) -> [u8; P256_PUBLIC_KEY_SIZE] {
    let point = key.to_encoded_point(false);
    let mut bytes = [0u8; P256_PUBLIC_KEY_SIZE];
    bytes.copy_from_slice(point.as_bytes());
    bytes
}

/// Decodes SEC1 bytes into a P-256 public key.
///
/// # Errors
/// Returns `InvalidPublicKey` if the bytes are not a valid point.
pub fn decode_public_key(sec1_bytes: &[u8]) -> Result<PublicKey> {
    PublicKey::from_sec1_bytes(sec1_bytes).map_err(|_| CoreError::InvalidPublicKey)
}

// ============================================
// SharedSecret
// ============================================

/// The 32-byte x-coordinate produced by the P-256 ECDH exchange.
///
/// # Security
/// - Stored only long enough to feed the key schedule
/// - Zeroed on drop
/// - Never logged or serialized
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret([u8; SHARED_SECRET_SIZE]);

impl SharedSecret {
    /// Creates a shared secret from raw bytes (used in deterministic tests).
    #[must_use]
    pub const fn from_bytes(bytes: [u8; SHARED_SECRET_SIZE]) -> Self {
        Self(bytes)
    }

    /// Returns the raw secret bytes.
    ///
    /// # Security Warning
    /// Handle the returned reference carefully. Do not log or store
    /// the material in unprotected storage.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; SHARED_SECRET_SIZE] {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret material
        write!(f, "SharedSecret([REDACTED])")
    }
}

// ============================================
// SessionKey
// ============================================

/// Symmetric 32-byte key produced by the session key schedule.
///
/// # Security
/// - Zeroed on drop
/// - Never logged or serialized
/// - Constant-time comparison
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKey([u8; 32]);

impl SessionKey {
    /// Creates a session key from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw key bytes.
    ///
    /// # Security Warning
    /// Handle the returned reference carefully. Do not log or
    /// store the key material in unprotected storage.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material
        write!(f, "SessionKey([REDACTED])")
    }
}

impl PartialEq for SessionKey {
    fn eq(&self, other: &Self) -> bool {
        ct_eq(&self.0, &other.0)
    }
}

impl Eq for SessionKey {}

// ============================================
// Tests
// ============================================
