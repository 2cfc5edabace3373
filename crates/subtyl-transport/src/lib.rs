// ============================================
// File: crates/subtyl-transport/src/lib.rs
// ============================================
//! # SubtylSocket Transport - Message-Boundary Adapters
//!
//! ## Creation Reason
//! The protocol core assumes an untrusted duplex transport that
//! delivers whole messages. This crate supplies that abstraction and
//! two concrete adapters.
//!
//! ## Main Functionality
//! - [`traits`]: The `MessageLink` interface
//! - [`memory`]: In-process pair for demos and tests
//! - [`framed`]: Length-prefixed frames over TCP
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              subtyl-demo                            │
//! │                    │                                │
//! │         ┌──────────┴──────────┐                    │
//! │         ▼                     ▼                    │
//! │   subtyl-core          subtyl-transport            │
//! │         │             You are here                 │
//! │         └──────────┬──────────┘                    │
//! │                    ▼                               │
//! │             subtyl-common                          │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - This crate never inspects message contents; everything above the
//!   byte level (JSON, base64, handshake) lives in subtyl-core
//! - The handshake has no timers; an owner using these adapters must
//!   bound how long a peer may dwell in a pre-confirmed state
//!
//! ## Last Modified
//! v0.1.0 - Initial transport adapters

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod framed;
pub mod memory;
pub mod traits;

// Re-export primary types
pub use error::{Result, TransportError};
pub use framed::FramedTcpLink;
pub use memory::MemoryLink;
pub use traits::MessageLink;
