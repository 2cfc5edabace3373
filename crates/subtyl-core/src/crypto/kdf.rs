// ============================================
// File: crates/subtyl-core/src/crypto/kdf.rs
// ============================================
//! # Key Derivation Functions
//!
//! ## Creation Reason
//! Provides the RFC 5869 HKDF-SHA256 Extract-then-Expand primitive the
//! session key schedule is built on.
//!
//! ## Main Functionality
//! - `hkdf_sha256`: Extract-then-Expand with explicit output length
//! - `hkdf_sha256_into`: Same, writing into a caller-provided buffer
//!
//! ## RFC 5869 Shape
//! ```text
//! PRK  = HMAC-SHA256(salt, ikm)                       (Extract)
//! T(i) = HMAC-SHA256(PRK, T(i-1) || info || byte(i))  (Expand)
//! OKM  = T(1) || T(2) || ... truncated to L
//! ```
//! Output lengths above 255 * 32 = 8160 bytes are rejected with
//! `LengthTooLarge`.
//!
//! ## Last Modified
//! v0.1.0 - Initial HKDF implementation

use hkdf::Hkdf;
use sha2::Sha256;

use super::HKDF_MAX_OUTPUT;
use crate::error::{CoreError, Result};

// ============================================
// Key Derivation
// ============================================

/// Derives `output_len` bytes of key material via HKDF-SHA256.
///
/// # Arguments
/// * `ikm` - Input keying material
/// * `salt` - Extraction salt
/// * `info` - Context/application-specific info
/// * `output_len` - Desired output length in bytes
///
/// # Errors
/// Returns `LengthTooLarge` if `output_len` exceeds 8160 bytes.
pub fn hkdf_sha256(ikm: &[u8], salt: &[u8], info: &[u8], output_len: usize) -> Result<Vec<u8>> {
    let mut output = vec![0u8; output_len];
    hkdf_sha256_into(ikm, salt, info, &mut output)?;
    Ok(output)
}

/// Derives key material via HKDF-SHA256 into a caller-provided buffer.
///
/// # Errors
/// Returns `LengthTooLarge` if `output.len()` exceeds 8160 bytes.
pub fn hkdf_sha256_into(ikm: &[u8], salt: &[u8], info: &[u8], output: &mut [u8]) -> Result<()> {
    if output.len() > HKDF_MAX_OUTPUT {
        return Err(CoreError::LengthTooLarge {
            requested: output.len(),
            max: HKDF_MAX_OUTPUT,
        });
    }

    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
    hk.expand(info, output)
        .map_err(|_| CoreError::LengthTooLarge {
            requested: output.len(),
            max: HKDF_MAX_OUTPUT,
        })
}

// ============================================
// Tests
// ============================================
