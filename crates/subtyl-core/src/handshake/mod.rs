// ============================================
// File: crates/subtyl-core/src/handshake/mod.rs
// ============================================
//! # Handshake State Machines
//!
//! ## Creation Reason
//! Drives the four-message authenticated key agreement between the
//! Initiator (provider) and Responder (consumer), producing the
//! per-session key bundle once both sides have proven possession of
//! the same derived secret.
//!
//! ## Main Functionality
//! - [`Initiator`]: provider-side state machine
//! - [`Responder`]: consumer-side state machine
//! - [`HandshakeOutcome`] / [`HandshakeStatus`]: discriminated result
//!   of every `start`/`handle` call
//!
//! ## Message Flow
//! ```text
//! Initiator                                 Responder
//! ---------                                 ---------
//! handshake-init       ────────────▶
//!                                           (verify version, algs)
//!                      ◀──────────── handshake-response
//! (verify sessionId,
//!  derive keys,
//!  compute MAC_I)
//! key-confirmation-request ────────▶
//!                                           (derive keys,
//!                                            verify MAC_I,
//!                                            compute MAC_R)
//!                      ◀──────────── key-confirmation
//! (verify MAC_R)
//! state = Confirmed                         state = Confirmed
//! ```
//!
//! ## Concurrency Model
//! Single-threaded and event-driven: each call runs to completion and
//! returns the outbound message (if any) plus the new status. No locks,
//! no blocking, no timers; each peer instance is owned by one transport
//! dispatcher, which must transmit the outbound message before
//! dispatching the next inbound one.
//!
//! ## ⚠️ Important Note for Next Developer
//! - Transitions are irreversible; every error drives the machine to
//!   `Failed`, zeroizes secrets, and is returned again on later calls
//! - Derived keys are reachable ONLY in the `Confirmed` state, and the
//!   confirmation key never leaves this module
//! - Peer identity is NOT authenticated here; an active attacker who
//!   can speak to both sides independently defeats this protocol unless
//!   the transport provides endpoint authentication
//!
//! ## Last Modified
//! v0.1.0 - Initial handshake state machines

mod initiator;
mod responder;

pub use initiator::Initiator;
pub use responder::Responder;

use crate::protocol::messages::Message;

// ============================================
// HandshakeStatus
// ============================================

/// Terminal status reported by every `start`/`handle` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStatus {
    /// More messages are expected.
    InProgress,
    /// Both sides hold confirmed, byte-identical keys.
    Confirmed,
    /// The machine is dead; only `destroy()` remains.
    Failed,
}

impl std::fmt::Display for HandshakeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InProgress => write!(f, "InProgress"),
            Self::Confirmed => write!(f, "Confirmed"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

// ============================================
// HandshakeOutcome
// ============================================

/// Discriminated result of a successful `start`/`handle` call.
///
/// The owner must transmit `outbound` (when present) before dispatching
/// any subsequent inbound message to the same peer.
#[derive(Debug, Clone)]
pub struct HandshakeOutcome {
    /// Message to transmit to the peer, if any.
    pub outbound: Option<Message>,
    /// Status after this call.
    pub status: HandshakeStatus,
}

impl HandshakeOutcome {
    /// An outcome that sends a message and keeps the handshake running.
    #[must_use]
    pub(crate) fn send(msg: Message) -> Self {
        Self {
            outbound: Some(msg),
            status: HandshakeStatus::InProgress,
        }
    }

    /// An outcome that sends a message and ends in `Confirmed`.
    #[must_use]
    pub(crate) fn send_confirmed(msg: Message) -> Self {
        Self {
            outbound: Some(msg),
            status: HandshakeStatus::Confirmed,
        }
    }

    /// A quiet outcome with the given status.
    #[must_use]
    pub(crate) const fn quiet(status: HandshakeStatus) -> Self {
        Self {
            outbound: None,
            status,
        }
    }
}
