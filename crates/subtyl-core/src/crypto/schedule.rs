// ============================================
// File: crates/subtyl-core/src/crypto/schedule.rs
// ============================================
//! # Session Key Schedule
//!
//! ## Creation Reason
//! Derives the three per-session symmetric keys from the ECDH shared
//! secret and the combined peer nonces, with full domain separation
//! between the derived keys.
//!
//! ## Main Functionality
//! - `derive_keys`: shared secret + nonces → `DerivedKeys`
//! - `DerivedKeys`: encryption / authentication / confirmation bundle
//! - `SessionKeys`: the externally visible encryption + authentication
//!   pair (the confirmation key never leaves the handshake)
//!
//! ## Derivation
//! ```text
//! salt         = initiator_nonce || responder_nonce          (64 B)
//! info(label)  = [len(label)] || utf8(label) || [version=1]
//!
//! encryption     = HKDF(shared, salt, info("SubtylSocket-Encryption"),      32)
//! authentication = HKDF(shared, salt, info("SubtylSocket-Authentication"),  32)
//! confirmation   = HKDF(shared, salt, info("SubtylSocket-KeyConfirmation"), 32)
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - The info prefix (length octet + label + version octet) is byte-exact
//!   wire-compatibility surface; changing it breaks interoperability
//! - The three labels are distinct and non-prefix, so a compromise of
//!   one derived key cannot be leveraged against another
//! - All three keys install together or not at all
//!
//! ## Last Modified
//! v0.1.0 - Initial key schedule

use zeroize::{Zeroize, ZeroizeOnDrop};

use subtyl_common::types::{Nonce, NONCE_SIZE};

use super::kdf::hkdf_sha256_into;
use super::keys::{SessionKey, SharedSecret};
use super::{KDF_INFO_VERSION, LABEL_AUTHENTICATION, LABEL_ENCRYPTION, LABEL_KEY_CONFIRMATION};
use crate::error::Result;

// ============================================
// DerivedKeys
// ============================================

/// The full three-key bundle produced by the schedule.
///
/// Internal to the handshake: `confirmation` authenticates the
/// transcript and is never exposed to callers. The externally visible
/// subset is [`SessionKeys`].
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKeys {
    /// AEAD encryption key for the post-handshake channel.
    pub encryption: SessionKey,
    /// Reserved for a future record-layer MAC.
    pub authentication: SessionKey,
    /// Key-confirmation MAC key; handshake-internal.
    pub confirmation: SessionKey,
}

impl DerivedKeys {
    /// Returns the externally visible encryption + authentication pair.
    #[must_use]
    pub fn session_keys(&self) -> SessionKeys {
        SessionKeys {
            encryption: self.encryption.clone(),
            authentication: self.authentication.clone(),
        }
    }
}

impl std::fmt::Debug for DerivedKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DerivedKeys([REDACTED])")
    }
}

// ============================================
// SessionKeys
// ============================================

/// The key pair a confirmed handshake hands to its owner.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKeys {
    /// AEAD encryption key for the post-handshake channel.
    pub encryption: SessionKey,
    /// Reserved for a future record-layer MAC; derived and zeroized
    /// but not consumed by the current channel.
    pub authentication: SessionKey,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionKeys([REDACTED])")
    }
}

// ============================================
// Key Derivation
// ============================================

/// Derives the three session keys from the shared secret and nonces.
///
/// Both peers call this with the same argument order (initiator nonce
/// first), so the derived keys are byte-identical on both sides.
///
/// # Errors
/// Propagates HKDF failures (practically unreachable for 32-byte
/// outputs).
pub fn derive_keys(
    shared_secret: &SharedSecret,
    initiator_nonce: &Nonce,
    responder_nonce: &Nonce,
) -> Result<DerivedKeys> {
    // salt = initiator_nonce || responder_nonce
    let mut salt = [0u8; NONCE_SIZE * 2];
    salt[..NONCE_SIZE].copy_from_slice(initiator_nonce.as_bytes());
    salt[NONCE_SIZE..].copy_from_slice(responder_nonce.as_bytes());

    let result = (|| {
        let encryption = derive_one(shared_secret, &salt, LABEL_ENCRYPTION)?;
        let authentication = derive_one(shared_secret, &salt, LABEL_AUTHENTICATION)?;
        let confirmation = derive_one(shared_secret, &salt, LABEL_KEY_CONFIRMATION)?;

        Ok(DerivedKeys {
            encryption,
            authentication,
            confirmation,
        })
    })();

    salt.zeroize();
    result
}

/// Derives a single 32-byte key for the given domain label.
fn derive_one(shared_secret: &SharedSecret, salt: &[u8], label: &str) -> Result<SessionKey> {
    let info = encode_info(label);

    let mut key_bytes = [0u8; 32];
    let derived = hkdf_sha256_into(shared_secret.as_bytes(), salt, &info, &mut key_bytes);

    match derived {
        Ok(()) => Ok(SessionKey::from_bytes(key_bytes)),
        Err(e) => {
            key_bytes.zeroize();
            Err(e)
        }
    }
}

/// Encodes the HKDF info string: `[len(label)] || label || [version]`.
///
/// The leading length octet makes the labels non-prefix of each other
/// even under concatenation; the trailing version octet leaves room for
/// a future hash migration.
fn encode_info(label: &str) -> Vec<u8> {
    let bytes = label.as_bytes();
    let mut info = Vec::with_capacity(bytes.len() + 2);
    info.push(bytes.len() as u8);
    info.extend_from_slice(bytes);
    info.push(KDF_INFO_VERSION);
    info
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (SharedSecret, Nonce, Nonce) {
        (
            SharedSecret::from_bytes([0x42u8; 32]),
            Nonce::from_array([0x01u8; 32]),
            Nonce::from_array([0x02u8; 32]),
        )
    }

    #[test]
    fn test_derive_keys_deterministic() {
        let (secret, n_i, n_r) = fixture();

        let a = derive_keys(&secret, &n_i, &n_r).unwrap();
        let b = derive_keys(&secret, &n_i, &n_r).unwrap();

        assert_eq!(a.encryption, b.encryption);
        assert_eq!(a.authentication, b.authentication);
        assert_eq!(a.confirmation, b.confirmation);
    }

    #[test]
    fn test_domain_separation() {
        let (secret, n_i, n_r) = fixture();
        let keys = derive_keys(&secret, &n_i, &n_r).unwrap();

        // All three keys must differ from each other
        assert_ne!(keys.encryption, keys.authentication);
        assert_ne!(keys.encryption, keys.confirmation);
        assert_ne!(keys.authentication, keys.confirmation);
    }

    #[test]
    fn test_nonce_order_matters() {
        let (secret, n_i, n_r) = fixture();

        let forward = derive_keys(&secret, &n_i, &n_r).unwrap();
        let swapped = derive_keys(&secret, &n_r, &n_i).unwrap();

        assert_ne!(forward.encryption, swapped.encryption);
    }

    #[test]
    fn test_single_bit_nonce_flip_changes_keys() {
        let (secret, n_i, n_r) = fixture();
        let baseline = derive_keys(&secret, &n_i, &n_r).unwrap();

        let mut flipped_bytes = *n_i.as_bytes();
        flipped_bytes[0] ^= 0x01;
        let flipped = Nonce::from_array(flipped_bytes);

        let keys = derive_keys(&secret, &flipped, &n_r).unwrap();
        assert_ne!(baseline.encryption, keys.encryption);
        assert_ne!(baseline.authentication, keys.authentication);
        assert_ne!(baseline.confirmation, keys.confirmation);
    }

    #[test]
    fn test_shared_secret_sensitivity() {
        let (_, n_i, n_r) = fixture();

        let a = derive_keys(&SharedSecret::from_bytes([0x42u8; 32]), &n_i, &n_r).unwrap();
        let b = derive_keys(&SharedSecret::from_bytes([0x43u8; 32]), &n_i, &n_r).unwrap();

        assert_ne!(a.encryption, b.encryption);
    }

    #[test]
    fn test_info_encoding() {
        let info = encode_info("SubtylSocket-Encryption");

        // [len] || label || [version]
        assert_eq!(info[0], 23);
        assert_eq!(&info[1..24], b"SubtylSocket-Encryption");
        assert_eq!(info[24], KDF_INFO_VERSION);
        assert_eq!(info.len(), 25);
    }

    #[test]
    fn test_session_keys_subset() {
        let (secret, n_i, n_r) = fixture();
        let derived = derive_keys(&secret, &n_i, &n_r).unwrap();
        let visible = derived.session_keys();

        assert_eq!(visible.encryption, derived.encryption);
        assert_eq!(visible.authentication, derived.authentication);
    }
}
