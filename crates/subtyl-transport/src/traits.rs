// ============================================
// File: crates/subtyl-transport/src/traits.rs
// ============================================
//! # Transport Traits
//!
//! ## Creation Reason
//! Defines the abstract interface the handshake's owner drives its
//! transport through. The protocol core assumes an untrusted duplex
//! transport that preserves message boundaries; adapters provide those
//! boundaries however they like.
//!
//! ## Main Functionality
//! - `MessageLink`: message-boundary-preserving duplex endpoint
//!
//! ## Design Philosophy
//! - The handshake state machine is single-threaded and event-driven;
//!   it never touches a link itself. The owner pulls a message from the
//!   link, dispatches it to the peer, and pushes the peer's outbound
//!   message back out - in that order.
//! - Adapters own their internal synchronisation; the trait is sync
//! - One dispatcher owns each peer instance; links may still be shared
//!   across threads by the adapter's owner
//!
//! ## ⚠️ Important Note for Next Developer
//! - Messages are opaque byte strings here; framing/JSON live elsewhere
//! - `recv` blocks until a message arrives or the link closes
//!
//! ## Last Modified
//! v0.1.0 - Initial trait definitions

use crate::error::Result;

// ============================================
// MessageLink Trait
// ============================================

/// A duplex endpoint that delivers whole messages in order.
///
/// # Ordering
/// Messages sent on one endpoint arrive on the other endpoint in send
/// order. The owner must transmit a peer's outbound message before
/// dispatching the next inbound one to that peer.
///
/// # Example
/// ```ignore
/// fn pump(link: &dyn MessageLink, peer: &mut Responder) -> Result<()> {
///     loop {
///         let inbound = link.recv()?;
///         let outcome = peer.handle_raw(&inbound)?;
///         if let Some(outbound) = outcome.outbound {
///             link.send(&encode_message(&outbound)?)?;
///         }
///     }
/// }
/// ```
pub trait MessageLink: Send + Sync {
    /// Sends one message to the remote endpoint.
    ///
    /// # Errors
    /// Returns an error if the link is closed or the message cannot
    /// be delivered.
    fn send(&self, msg: &[u8]) -> Result<()>;

    /// Receives one message, blocking until one arrives.
    ///
    /// # Errors
    /// Returns `Closed` if the link closes while waiting.
    fn recv(&self) -> Result<Vec<u8>>;

    /// Receives one message if one is already queued.
    ///
    /// # Errors
    /// Returns `Closed` if the link is closed and drained.
    fn try_recv(&self) -> Result<Option<Vec<u8>>>;

    /// Closes the link. Idempotent.
    fn close(&self);

    /// Returns `true` while the link can still move messages.
    fn is_open(&self) -> bool;
}
