// ============================================
// File: crates/subtyl-core/src/channel.rs
// ============================================
//! # Secure Channel
//!
//! ## Creation Reason
//! Post-handshake message protection. Wraps the confirmed encryption
//! key and an AEAD suite into the JSON envelope form used for routing.
//!
//! ## Main Functionality
//! - `SecureChannel`: encrypt/decrypt with envelope assembly
//! - Algorithm-name verification on ingest
//!
//! ## Envelope Shape
//! ```text
//! { "type": "encrypted-plugin-message",
//!   "algorithm": "aes-256-gcm",
//!   "encrypted": { "data": <b64>,
//!                  "metadata": { "iv": <b64,12B>, "tag": <b64,16B> } } }
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - A fresh random 12-byte IV is drawn per encrypt call; uniqueness is
//!   probabilistic and holds under the 2^32 messages-per-key ceiling
//! - The authentication key is carried and zeroized but not consumed;
//!   it is reserved for a future record-layer MAC
//!
//! ## Last Modified
//! v0.1.0 - Initial channel implementation

use tracing::debug;

use crate::crypto::aead::{Aes256GcmSuite, AeadSuite, EncryptedPayload};
use crate::crypto::schedule::SessionKeys;
use crate::crypto::{rng, AES_GCM_IV_SIZE, AES_GCM_TAG_SIZE};
use crate::error::{CoreError, Result};
use crate::protocol::messages::{EncryptedBody, EncryptedEnvelope, EnvelopeMetadata};

// ============================================
// SecureChannel
// ============================================

/// AEAD message channel over a confirmed key pair.
///
/// # Example
/// ```no_run
/// use subtyl_core::channel::SecureChannel;
/// # fn demo(keys: subtyl_core::crypto::SessionKeys) -> subtyl_core::error::Result<()> {
/// let channel = SecureChannel::new(keys);
/// let envelope = channel.encrypt(b"hello")?;
/// let plaintext = channel.decrypt(&envelope)?;
/// assert_eq!(plaintext, b"hello");
/// # Ok(())
/// # }
/// ```
pub struct SecureChannel {
    keys: SessionKeys,
    suite: Box<dyn AeadSuite>,
}

impl SecureChannel {
    /// Creates a channel over the confirmed keys with the default
    /// AES-256-GCM suite.
    #[must_use]
    pub fn new(keys: SessionKeys) -> Self {
        Self {
            keys,
            suite: Box::new(Aes256GcmSuite::new()),
        }
    }

    /// Creates a channel with an explicit AEAD suite.
    ///
    /// Additional algorithms join by implementing [`AeadSuite`], not by
    /// subclassing anything.
    #[must_use]
    pub fn with_suite(keys: SessionKeys, suite: Box<dyn AeadSuite>) -> Self {
        Self { keys, suite }
    }

    /// The wire name of the channel's AEAD algorithm.
    #[must_use]
    pub fn algorithm_name(&self) -> &'static str {
        self.suite.algorithm_name()
    }

    /// Encrypts a plaintext into a routable envelope.
    ///
    /// Draws a fresh random 12-byte IV per call.
    ///
    /// # Errors
    /// `InsufficientEntropy` on a degenerate IV draw; AEAD errors
    /// otherwise.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptedEnvelope> {
        let iv = rng::generate_iv()?;
        let payload = self.suite.seal(&self.keys.encryption, &iv, plaintext)?;

        debug!(bytes = plaintext.len(), "envelope sealed");

        Ok(EncryptedEnvelope {
            algorithm: self.suite.algorithm_name().to_string(),
            encrypted: EncryptedBody {
                data: payload.data,
                metadata: EnvelopeMetadata {
                    iv: payload.iv.to_vec(),
                    tag: payload.tag.to_vec(),
                },
            },
        })
    }

    /// Decrypts an inbound envelope.
    ///
    /// # Errors
    /// - `UnsupportedAlgorithm` if the envelope names a different AEAD
    /// - `MalformedMessage` on wrong IV/tag lengths
    /// - `AeadTagMismatch` on any alteration of the ciphertext
    pub fn decrypt(&self, envelope: &EncryptedEnvelope) -> Result<Vec<u8>> {
        if envelope.algorithm != self.suite.algorithm_name() {
            return Err(CoreError::unsupported_algorithm(format!(
                "envelope algorithm '{}' does not match channel '{}'",
                envelope.algorithm,
                self.suite.algorithm_name()
            )));
        }

        let metadata = &envelope.encrypted.metadata;

        let iv: [u8; AES_GCM_IV_SIZE] = metadata
            .iv
            .as_slice()
            .try_into()
            .map_err(|_| CoreError::malformed("envelope IV must be 12 bytes"))?;
        let tag: [u8; AES_GCM_TAG_SIZE] = metadata
            .tag
            .as_slice()
            .try_into()
            .map_err(|_| CoreError::malformed("envelope tag must be 16 bytes"))?;

        let payload = EncryptedPayload {
            data: envelope.encrypted.data.clone(),
            iv,
            tag,
        };

        self.suite.open(&self.keys.encryption, &payload)
    }
}

impl std::fmt::Debug for SecureChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureChannel")
            .field("algorithm", &self.suite.algorithm_name())
            .finish_non_exhaustive()
    }
}

// ============================================
// Tests
// ============================================
