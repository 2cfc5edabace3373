// ============================================
// File: crates/subtyl-core/src/crypto/rng.rs
// ============================================
//! # Checked Random Generation
//!
//! ## Creation Reason
//! Every random value the protocol consumes (session ids, handshake
//! nonces, AEAD IVs) is drawn through this module so a catastrophically
//! broken entropy source is detected instead of silently producing
//! predictable keys.
//!
//! ## Main Functionality
//! - `random_array`: Fill a fixed-size buffer from the OS CSPRNG
//! - `generate_session_id` / `generate_nonce` / `generate_iv`
//!
//! ## Sanity Check
//! A draw that comes back all-0x00 or all-0xFF fails with
//! `InsufficientEntropy`. This is a cheap tripwire, not a statistical
//! test; a working CSPRNG produces such a buffer with probability
//! 2^-255 for a 32-byte draw.
//!
//! ## ⚠️ Important Note for Next Developer
//! - The OS CSPRNG is treated as a re-entrant global; no locking here
//! - Do not bypass this module with direct OsRng draws in protocol code
//!
//! ## Last Modified
//! v0.1.0 - Initial checked RNG implementation

use rand::rngs::OsRng;
use rand::RngCore;

use subtyl_common::types::{Nonce, SessionId, NONCE_SIZE, SESSION_ID_SIZE};

use super::AES_GCM_IV_SIZE;
use crate::error::{CoreError, Result};

// ============================================
// Checked Draws
// ============================================

/// Fills a fixed-size array from the OS CSPRNG with a sanity check.
///
/// # Errors
/// Returns `InsufficientEntropy` if the returned buffer is all-zero or
/// all-0xFF.
pub fn random_array<const N: usize>() -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    OsRng.fill_bytes(&mut buf);

    if is_degenerate(&buf) {
        return Err(CoreError::InsufficientEntropy);
    }

    Ok(buf)
}

/// Generates a fresh 16-byte session identifier.
///
/// # Errors
/// Returns `InsufficientEntropy` on a degenerate CSPRNG draw.
pub fn generate_session_id() -> Result<SessionId> {
    random_array::<SESSION_ID_SIZE>().map(SessionId::from_array)
}

/// Generates a fresh 32-byte handshake nonce.
///
/// # Errors
/// Returns `InsufficientEntropy` on a degenerate CSPRNG draw.
pub fn generate_nonce() -> Result<Nonce> {
    random_array::<NONCE_SIZE>().map(Nonce::from_array)
}

/// Generates a fresh 12-byte AES-GCM IV.
///
/// IV uniqueness across a session is probabilistic; with the 2^32
/// message ceiling per key the birthday bound is acceptable.
///
/// # Errors
/// Returns `InsufficientEntropy` on a degenerate CSPRNG draw.
pub fn generate_iv() -> Result<[u8; AES_GCM_IV_SIZE]> {
    random_array::<AES_GCM_IV_SIZE>()
}

/// Checks whether a buffer is all-0x00 or all-0xFF.
fn is_degenerate(buf: &[u8]) -> bool {
    let mut and_fold = 0xFFu8;
    let mut or_fold = 0x00u8;
    for &byte in buf {
        and_fold &= byte;
        or_fold |= byte;
    }
    or_fold == 0x00 || and_fold == 0xFF
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_array_draws_differ() {
        let a = random_array::<32>().unwrap();
        let b = random_array::<32>().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_degenerate_detection() {
        assert!(is_degenerate(&[0x00u8; 32]));
        assert!(is_degenerate(&[0xFFu8; 32]));
        assert!(!is_degenerate(&[0x42u8; 32]));

        let mut mixed = [0x00u8; 32];
        mixed[7] = 0x01;
        assert!(!is_degenerate(&mixed));

        let mut mostly_ff = [0xFFu8; 32];
        mostly_ff[0] = 0xFE;
        assert!(!is_degenerate(&mostly_ff));
    }

    #[test]
    fn test_generate_session_id() {
        let a = generate_session_id().unwrap();
        let b = generate_session_id().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_generate_nonce() {
        let a = generate_nonce().unwrap();
        let b = generate_nonce().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_generate_iv_size() {
        let iv = generate_iv().unwrap();
        assert_eq!(iv.len(), AES_GCM_IV_SIZE);
    }
}
