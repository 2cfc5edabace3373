// ============================================
// File: crates/subtyl-core/src/protocol/version.rs
// ============================================
//! # Protocol Versioning & Algorithm Negotiation
//!
//! ## Creation Reason
//! Manages the protocol version check and the cipher/hash negotiation
//! performed by the Responder on `HANDSHAKE_INIT`.
//!
//! ## Versioning Strategy
//! - Single integer version, currently 1
//! - Any wire-format change increments it
//! - The HKDF info encoding carries its own version octet so a future
//!   hash migration can move the key schedule independently
//!
//! ## Negotiation
//! The Responder intersects the Initiator's offered ciphers and hashes
//! with the local support lists and echoes its selection; the Initiator
//! must accept the echo or abort. The current version supports exactly
//! one pair, so selection is trivial but the fields are still required.
//!
//! ## Last Modified
//! v0.1.0 - Initial version and negotiation logic

use tracing::debug;

use crate::error::{CoreError, Result};

// ============================================
// Constants
// ============================================

/// Current protocol version.
pub const PROTOCOL_VERSION: u32 = 1;

/// AEAD ciphers supported by this implementation, in preference order.
pub const SUPPORTED_CIPHERS: &[&str] = &["aes-256-gcm"];

/// Hash functions supported by this implementation, in preference order.
pub const SUPPORTED_HASHES: &[&str] = &["sha256"];

// ============================================
// Version Check
// ============================================

/// Checks a received protocol version.
///
/// # Errors
/// Returns `UnsupportedVersion` for anything other than the current
/// version.
pub fn check_version(got: u32) -> Result<()> {
    if got == PROTOCOL_VERSION {
        Ok(())
    } else {
        Err(CoreError::UnsupportedVersion {
            got,
            expected: PROTOCOL_VERSION,
        })
    }
}

// ============================================
// Negotiation
// ============================================

/// Responder-side selection of a cipher/hash pair.
///
/// Picks the first locally supported entry from each offered list
/// (local preference order wins for future multi-algorithm versions).
///
/// # Errors
/// Returns `UnsupportedAlgorithm` if either intersection is empty.
pub fn negotiate(
    offered_ciphers: &[String],
    offered_hashes: &[String],
) -> Result<(&'static str, &'static str)> {
    let cipher = SUPPORTED_CIPHERS
        .iter()
        .find(|supported| offered_ciphers.iter().any(|c| c == *supported))
        .copied()
        .ok_or_else(|| CoreError::unsupported_algorithm("no common cipher"))?;

    let hash = SUPPORTED_HASHES
        .iter()
        .find(|supported| offered_hashes.iter().any(|h| h == *supported))
        .copied()
        .ok_or_else(|| CoreError::unsupported_algorithm("no common hash"))?;

    debug!(cipher, hash, "negotiated algorithm pair");
    Ok((cipher, hash))
}

/// Initiator-side check of the Responder's echoed selection.
///
/// # Errors
/// Returns `UnsupportedAlgorithm` if the selection is not locally
/// supported.
pub fn confirm_selection(cipher: &str, hash: &str) -> Result<()> {
    if !SUPPORTED_CIPHERS.contains(&cipher) {
        return Err(CoreError::unsupported_algorithm(format!(
            "responder selected unsupported cipher '{cipher}'"
        )));
    }
    if !SUPPORTED_HASHES.contains(&hash) {
        return Err(CoreError::unsupported_algorithm(format!(
            "responder selected unsupported hash '{hash}'"
        )));
    }
    Ok(())
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_check_version() {
        assert!(check_version(1).is_ok());

        let result = check_version(999);
        assert!(matches!(
            result,
            Err(CoreError::UnsupportedVersion { got: 999, .. })
        ));

        assert!(check_version(0).is_err());
    }

    #[test]
    fn test_negotiate_happy_path() {
        let (cipher, hash) =
            negotiate(&owned(&["aes-256-gcm"]), &owned(&["sha256"])).unwrap();
        assert_eq!(cipher, "aes-256-gcm");
        assert_eq!(hash, "sha256");
    }

    #[test]
    fn test_negotiate_with_extra_offers() {
        let (cipher, hash) = negotiate(
            &owned(&["chacha20-poly1305", "aes-256-gcm"]),
            &owned(&["blake3", "sha256"]),
        )
        .unwrap();
        assert_eq!(cipher, "aes-256-gcm");
        assert_eq!(hash, "sha256");
    }

    #[test]
    fn test_negotiate_no_common_cipher() {
        let result = negotiate(&owned(&["weak-cipher"]), &owned(&["sha256"]));
        assert!(matches!(result, Err(CoreError::UnsupportedAlgorithm { .. })));
    }

    #[test]
    fn test_negotiate_no_common_hash() {
        let result = negotiate(&owned(&["aes-256-gcm"]), &owned(&["md5"]));
        assert!(matches!(result, Err(CoreError::UnsupportedAlgorithm { .. })));
    }

    #[test]
    fn test_negotiate_empty_offers() {
        let result = negotiate(&[], &[]);
        assert!(matches!(result, Err(CoreError::UnsupportedAlgorithm { .. })));
    }

    #[test]
    fn test_confirm_selection() {
        assert!(confirm_selection("aes-256-gcm", "sha256").is_ok());
        assert!(confirm_selection("des", "sha256").is_err());
        assert!(confirm_selection("aes-256-gcm", "md5").is_err());
    }
}
