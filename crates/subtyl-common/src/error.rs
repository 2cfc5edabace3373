// ============================================
// File: crates/subtyl-common/src/error.rs
// ============================================
//! # Common Error Types
//!
//! ## Creation Reason
//! Provides foundational error types and result aliases used across
//! the SubtylSocket crates, enabling consistent error handling.
//!
//! ## Main Functionality
//! - `CommonError`: Base error enum for common operations
//! - `Result<T>`: Type alias using `CommonError`
//! - Error conversion traits for interoperability
//!
//! ## Design Philosophy
//! - Use `thiserror` for ergonomic error definitions
//! - Each crate defines its own error type that may wrap `CommonError`
//! - Errors should be informative without leaking sensitive information
//!
//! ## ⚠️ Important Note for Next Developer
//! - Never include sensitive data (keys, nonces) in error messages
//! - Keep error variants specific but not too granular
//! - Implement `From` traits for seamless error propagation
//!
//! ## Last Modified
//! v0.1.0 - Initial error definitions

use thiserror::Error;

// ============================================
// Result Type Alias
// ============================================

/// Common result type for operations that may fail.
pub type Result<T> = std::result::Result<T, CommonError>;

// ============================================
// CommonError
// ============================================

/// Common error types shared across SubtylSocket crates.
///
/// # Categories
/// - **Validation**: Input validation failures
/// - **IO**: System I/O errors
/// - **Encoding**: Serialization/deserialization errors
/// - **Internal**: Unexpected internal state
#[derive(Error, Debug)]
pub enum CommonError {
    // ========================================
    // Validation Errors
    // ========================================
    /// Invalid input data provided.
    #[error("Invalid input for '{field}': {reason}")]
    InvalidInput {
        /// Name of the field or parameter
        field: String,
        /// Description of what's wrong
        reason: String,
    },

    /// Data length doesn't match expected size.
    #[error("Invalid length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Expected length in bytes
        expected: usize,
        /// Actual length received
        actual: usize,
    },

    // ========================================
    // IO Errors
    // ========================================
    /// System I/O error occurred.
    #[error("I/O error: {context}")]
    Io {
        /// What operation was being performed
        context: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    // ========================================
    // Encoding Errors
    // ========================================
    /// Failed to encode/serialize data.
    #[error("Encoding error: {context}")]
    Encoding {
        /// What was being encoded
        context: String,
        /// Error details
        details: String,
    },

    /// Failed to decode/deserialize data.
    #[error("Decoding error: {context}")]
    Decoding {
        /// What was being decoded
        context: String,
        /// Error details
        details: String,
    },

    // ========================================
    // Internal Errors
    // ========================================
    /// Internal error (bug or unexpected condition).
    #[error("Internal error: {message}")]
    Internal {
        /// Description of what went wrong
        message: String,
    },
}

impl CommonError {
    // ========================================
    // Convenience Constructors
    // ========================================

    /// Creates an `InvalidInput` error.
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an `InvalidLength` error.
    pub const fn invalid_length(expected: usize, actual: usize) -> Self {
        Self::InvalidLength { expected, actual }
    }

    /// Creates an `Io` error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Creates an `Internal` error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // ========================================
    // Error Classification
    // ========================================

    /// Returns `true` if this error indicates a caller mistake.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. } | Self::InvalidLength { .. } | Self::Decoding { .. }
        )
    }

    /// Returns `true` if this error indicates an internal issue.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

// ============================================
// Error Conversions
// ============================================

impl From<std::io::Error> for CommonError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            context: "unspecified I/O operation".into(),
            source: err,
        }
    }
}

impl From<base64::DecodeError> for CommonError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Decoding {
            context: "base64 decode".into(),
            details: err.to_string(),
        }
    }
}

// ============================================
// Tests
// ============================================
