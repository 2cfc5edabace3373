// ============================================
// File: crates/subtyl-core/src/crypto/handshake.rs
// ============================================
//! # Handshake Cryptography
//!
//! ## Creation Reason
//! Provides the transcript-bound key-confirmation MACs that close the
//! handshake. Each side proves possession of the derived confirmation
//! key over the exact bytes both peers observed on the wire.
//!
//! ## Main Functionality
//! - `confirmation_mac`: Build a directional confirmation MAC
//! - `verify_confirmation_mac`: Constant-time verification
//!
//! ## Transcript Layout
//! ```text
//! MAC_I = HMAC(K_conf, N_I || N_R || PK_I || PK_R)   Initiator → Responder
//! MAC_R = HMAC(K_conf, N_R || N_I || PK_R || PK_I)   Responder → Initiator
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - The byte order is asymmetric on purpose: each MAC lists its
//!   SENDER's nonce and public key first, so a MAC captured in one
//!   direction can never be replayed in the other
//! - Public keys enter the transcript in the same uncompressed SEC1
//!   form carried on the wire; both sides MAC byte-identical buffers
//! - Verification is constant-time; failure is `KeyConfirmationFailed`
//!
//! ## Last Modified
//! v0.1.0 - Initial confirmation MAC implementation

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroize;

use subtyl_common::types::Nonce;

use super::constant_time::ct_eq;
use super::keys::SessionKey;
use super::HMAC_TAG_SIZE;
use crate::error::{CoreError, Result};

type HmacSha256 = Hmac<Sha256>;

// ============================================
// Confirmation MACs
// ============================================

/// Computes a directional confirmation MAC over the handshake transcript.
///
/// # Arguments
/// * `key` - The derived confirmation key
/// * `sender_nonce` - Nonce of the peer that SENDS this MAC
/// * `receiver_nonce` - Nonce of the peer that verifies it
/// * `sender_public` - Sender's public key (wire SEC1 form)
/// * `receiver_public` - Receiver's public key (wire SEC1 form)
///
/// # Returns
/// A 32-byte HMAC-SHA-256 tag.
#[must_use]
pub fn confirmation_mac(
    key: &SessionKey,
    sender_nonce: &Nonce,
    receiver_nonce: &Nonce,
    sender_public: &[u8],
    receiver_public: &[u8],
) -> [u8; HMAC_TAG_SIZE] {
    let mut mac =
        HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC accepts any key length");
    mac.update(sender_nonce.as_bytes());
    mac.update(receiver_nonce.as_bytes());
    mac.update(sender_public);
    mac.update(receiver_public);

    let mut tag = [0u8; HMAC_TAG_SIZE];
    tag.copy_from_slice(&mac.finalize().into_bytes());
    tag
}

/// Verifies a received confirmation MAC in constant time.
///
/// The expected MAC is recomputed from locally stored state; the
/// arguments describe the transcript from the original SENDER's
/// perspective (the peer whose MAC is being checked).
///
/// # Errors
/// Returns `KeyConfirmationFailed` on any mismatch. This is treated as
/// indicating an active man-in-the-middle.
pub fn verify_confirmation_mac(
    key: &SessionKey,
    sender_nonce: &Nonce,
    receiver_nonce: &Nonce,
    sender_public: &[u8],
    receiver_public: &[u8],
    received: &[u8],
) -> Result<()> {
    let mut expected = confirmation_mac(
        key,
        sender_nonce,
        receiver_nonce,
        sender_public,
        receiver_public,
    );

    let matches = ct_eq(&expected, received);
    expected.zeroize();

    if matches {
        Ok(())
    } else {
        Err(CoreError::KeyConfirmationFailed)
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (SessionKey, Nonce, Nonce, Vec<u8>, Vec<u8>) {
        (
            SessionKey::from_bytes([0x42u8; 32]),
            Nonce::from_array([0x01u8; 32]),
            Nonce::from_array([0x02u8; 32]),
            vec![0x04u8; 65],
            vec![0x05u8; 65],
        )
    }

    #[test]
    fn test_mac_roundtrip() {
        let (key, n_i, n_r, pk_i, pk_r) = fixture();

        let mac = confirmation_mac(&key, &n_i, &n_r, &pk_i, &pk_r);
        assert!(verify_confirmation_mac(&key, &n_i, &n_r, &pk_i, &pk_r, &mac).is_ok());
    }

    #[test]
    fn test_mac_directional_asymmetry() {
        let (key, n_i, n_r, pk_i, pk_r) = fixture();

        // MAC_I and MAC_R cover the same material in opposite order
        let mac_i = confirmation_mac(&key, &n_i, &n_r, &pk_i, &pk_r);
        let mac_r = confirmation_mac(&key, &n_r, &n_i, &pk_r, &pk_i);

        assert_ne!(mac_i, mac_r);

        // Replaying one direction's MAC in the other fails verification
        let result = verify_confirmation_mac(&key, &n_i, &n_r, &pk_i, &pk_r, &mac_r);
        assert!(matches!(result, Err(CoreError::KeyConfirmationFailed)));
    }

    #[test]
    fn test_tampered_mac_rejected() {
        let (key, n_i, n_r, pk_i, pk_r) = fixture();

        let mut mac = confirmation_mac(&key, &n_i, &n_r, &pk_i, &pk_r);
        mac[0] ^= 0xFF;

        let result = verify_confirmation_mac(&key, &n_i, &n_r, &pk_i, &pk_r, &mac);
        assert!(matches!(result, Err(CoreError::KeyConfirmationFailed)));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let (key, n_i, n_r, pk_i, pk_r) = fixture();
        let other_key = SessionKey::from_bytes([0x43u8; 32]);

        let mac = confirmation_mac(&other_key, &n_i, &n_r, &pk_i, &pk_r);
        let result = verify_confirmation_mac(&key, &n_i, &n_r, &pk_i, &pk_r, &mac);
        assert!(matches!(result, Err(CoreError::KeyConfirmationFailed)));
    }

    #[test]
    fn test_wrong_length_mac_rejected() {
        let (key, n_i, n_r, pk_i, pk_r) = fixture();

        let result = verify_confirmation_mac(&key, &n_i, &n_r, &pk_i, &pk_r, &[0u8; 16]);
        assert!(matches!(result, Err(CoreError::KeyConfirmationFailed)));
    }

    #[test]
    fn test_transcript_sensitivity() {
        let (key, n_i, n_r, pk_i, pk_r) = fixture();
        let baseline = confirmation_mac(&key, &n_i, &n_r, &pk_i, &pk_r);

        // Any transcript element change produces a different MAC
        let mut other_pk = pk_r.clone();
        other_pk[10] ^= 0x01;
        let mac = confirmation_mac(&key, &n_i, &n_r, &pk_i, &other_pk);
        assert_ne!(baseline, mac);

        let mut other_nonce_bytes = *n_i.as_bytes();
        other_nonce_bytes[31] ^= 0x80;
        let other_nonce = Nonce::from_array(other_nonce_bytes);
        let mac = confirmation_mac(&key, &other_nonce, &n_r, &pk_i, &pk_r);
        assert_ne!(baseline, mac);
    }
}
