// ============================================
// File: crates/subtyl-core/src/crypto/aead.rs
// ============================================
//! # AEAD Primitives
//!
//! ## Creation Reason
//! Provides authenticated encryption for the post-handshake channel
//! using AES-256-GCM, behind a small capability trait so additional
//! algorithms join by adding another implementor.
//!
//! ## Main Functionality
//! - `AeadSuite`: capability set {algorithm name, seal, open}
//! - `Aes256GcmSuite`: the single default implementation
//! - `EncryptedPayload`: ciphertext + 12-byte IV + detached 16-byte tag
//!
//! ## Security Properties
//! - **AEAD**: Authenticated Encryption (no associated data in v1)
//! - **IV**: 12 bytes, fresh per call, supplied by the caller
//! - **Tag**: 16 bytes, carried detached on the wire
//!
//! ## ⚠️ Important Note for Next Developer
//! - Never reuse (key, IV) pairs - catastrophic for GCM
//! - IVs are ALWAYS 12 bytes for AES-GCM in this codebase
//! - Open failure is always `AeadTagMismatch`; do not distinguish
//!   causes to the caller
//!
//! ## Last Modified
//! v0.1.0 - Initial AEAD implementation

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce as GcmNonce};

use super::keys::SessionKey;
use super::{AES_GCM_IV_SIZE, AES_GCM_TAG_SIZE};
use crate::error::{CoreError, Result};

// ============================================
// EncryptedPayload
// ============================================

/// Output of an AEAD seal operation.
///
/// The tag rides detached from the ciphertext because the wire envelope
/// carries `data`, `iv` and `tag` as separate base64 fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    /// Ciphertext (same length as the plaintext).
    pub data: Vec<u8>,
    /// The 12-byte IV used for this message.
    pub iv: [u8; AES_GCM_IV_SIZE],
    /// The 16-byte authentication tag.
    pub tag: [u8; AES_GCM_TAG_SIZE],
}

// ============================================
// AeadSuite Trait
// ============================================

/// Capability set for an authenticated encryption algorithm.
///
/// # Purpose
/// The channel is written against this trait so that a future cipher
/// negotiation only needs a new implementor, not a new channel.
pub trait AeadSuite: Send + Sync {
    /// Canonical wire name of the algorithm (e.g. `aes-256-gcm`).
    fn algorithm_name(&self) -> &'static str;

    /// Encrypts `plaintext` under `key` with the given IV.
    ///
    /// # Errors
    /// Returns an error only on cipher construction failure.
    fn seal(
        &self,
        key: &SessionKey,
        iv: &[u8; AES_GCM_IV_SIZE],
        plaintext: &[u8],
    ) -> Result<EncryptedPayload>;

    /// Decrypts and authenticates a payload.
    ///
    /// # Errors
    /// Returns `AeadTagMismatch` on any alteration of data, IV or tag.
    fn open(&self, key: &SessionKey, payload: &EncryptedPayload) -> Result<Vec<u8>>;
}

// ============================================
// Aes256GcmSuite
// ============================================

/// Default implementation using AES-256-GCM.
#[derive(Debug, Default, Clone, Copy)]
pub struct Aes256GcmSuite;

impl Aes256GcmSuite {
    /// Canonical wire name of this suite.
    pub const NAME: &'static str = "aes-256-gcm";

    /// Creates a new instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl AeadSuite for Aes256GcmSuite {
    fn algorithm_name(&self) -> &'static str {
        Self::NAME
    }

    fn seal(
        &self,
        key: &SessionKey,
        iv: &[u8; AES_GCM_IV_SIZE],
        plaintext: &[u8],
    ) -> Result<EncryptedPayload> {
        let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|_| CoreError::malformed("AEAD cipher construction failed"))?;

        let nonce = GcmNonce::from_slice(iv);
        let mut combined = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CoreError::AeadTagMismatch)?;

        // aes-gcm appends the tag; the wire carries it detached
        let tag_offset = combined.len() - AES_GCM_TAG_SIZE;
        let mut tag = [0u8; AES_GCM_TAG_SIZE];
        tag.copy_from_slice(&combined[tag_offset..]);
        combined.truncate(tag_offset);

        Ok(EncryptedPayload {
            data: combined,
            iv: *iv,
            tag,
        })
    }

    fn open(&self, key: &SessionKey, payload: &EncryptedPayload) -> Result<Vec<u8>> {
        let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|_| CoreError::malformed("AEAD cipher construction failed"))?;

        let mut combined = Vec::with_capacity(payload.data.len() + AES_GCM_TAG_SIZE);
        combined.extend_from_slice(&payload.data);
        combined.extend_from_slice(&payload.tag);

        let nonce = GcmNonce::from_slice(&payload.iv);
        cipher
            .decrypt(nonce, combined.as_slice())
            .map_err(|_| CoreError::AeadTagMismatch)
    }
}

// ============================================
// Tests
// ============================================
