// ============================================
// File: crates/subtyl-core/src/handshake/initiator.rs
// ============================================
//! # Initiator State Machine
//!
//! ## Creation Reason
//! Provider-side half of the handshake. Generates the session id,
//! opens with `handshake-init`, derives keys on the response, proves
//! key possession with MAC_I and verifies the Responder's MAC_R.
//!
//! ## State Progression
//! ```text
//! Fresh ──start()──► InitSent ──response──► AwaitingConfirm
//!                                                │
//!                                        key-confirmation
//!                                                ▼
//!                                            Confirmed
//! (any error, any state) ──────────────────► Failed
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Each state variant carries exactly the secrets that state needs;
//!   "confirmed without derived keys" is unrepresentable
//! - The ephemeral private key is consumed by the ECDH exchange and
//!   cannot outlive the `InitSent` state
//!
//! ## Last Modified
//! v0.1.0 - Initial initiator implementation

use tracing::{debug, info, warn};

use subtyl_common::types::{Nonce, SessionId};

use crate::crypto::constant_time::ct_eq;
use crate::crypto::handshake::{confirmation_mac, verify_confirmation_mac};
use crate::crypto::keys::EphemeralKeyPair;
use crate::crypto::schedule::{derive_keys, DerivedKeys, SessionKeys};
use crate::crypto::{rng, P256_PUBLIC_KEY_SIZE};
use crate::error::{CoreError, Result};
use crate::protocol::messages::{
    HandshakeInit, HandshakeResponse, KeyConfirmRequest, KeyConfirmation, Message,
};
use crate::protocol::version::{confirm_selection, PROTOCOL_VERSION, SUPPORTED_CIPHERS, SUPPORTED_HASHES};

use super::{HandshakeOutcome, HandshakeStatus};

// ============================================
// InitiatorState
// ============================================

/// Tagged state with one payload shape per state.
enum InitiatorState {
    /// Constructed, `start()` not yet called.
    Fresh {
        nonce: Nonce,
        keypair: EphemeralKeyPair,
        public_key: [u8; P256_PUBLIC_KEY_SIZE],
    },
    /// `handshake-init` sent, waiting for the response.
    InitSent {
        nonce: Nonce,
        keypair: EphemeralKeyPair,
        public_key: [u8; P256_PUBLIC_KEY_SIZE],
    },
    /// Keys derived and MAC_I sent, waiting for MAC_R.
    AwaitingConfirm {
        nonce: Nonce,
        peer_nonce: Nonce,
        public_key: [u8; P256_PUBLIC_KEY_SIZE],
        peer_public: Vec<u8>,
        keys: DerivedKeys,
    },
    /// Handshake complete; keys installed.
    Confirmed { keys: DerivedKeys },
    /// Terminal failure; secrets already dropped.
    Failed,
}

impl InitiatorState {
    const fn label(&self) -> &'static str {
        match self {
            Self::Fresh { .. } => "Fresh",
            Self::InitSent { .. } => "InitSent",
            Self::AwaitingConfirm { .. } => "AwaitingConfirm",
            Self::Confirmed { .. } => "Confirmed",
            Self::Failed => "Failed",
        }
    }
}

// ============================================
// Initiator
// ============================================

/// Provider-side handshake peer.
///
/// Lives exactly one handshake. Must be destroyed by its owner; any
/// error makes the machine permanently `Failed`.
pub struct Initiator {
    session_id: SessionId,
    state: InitiatorState,
    terminal_error: Option<CoreError>,
}

impl Initiator {
    /// Creates a fresh Initiator with a new session id, nonce and
    /// ephemeral key pair.
    ///
    /// # Errors
    /// Returns `InsufficientEntropy` if the CSPRNG sanity check fails.
    pub fn new() -> Result<Self> {
        let session_id = rng::generate_session_id()?;
        let nonce = rng::generate_nonce()?;
        let keypair = EphemeralKeyPair::generate();
        let public_key = keypair.public_key_bytes();

        debug!(session_id = %session_id, "initiator created");

        Ok(Self {
            session_id,
            state: InitiatorState::Fresh {
                nonce,
                keypair,
                public_key,
            },
            terminal_error: None,
        })
    }

    /// Opens the handshake, producing the `handshake-init` message.
    ///
    /// # Errors
    /// Fails the session if called in any state other than `Fresh`.
    pub fn start(&mut self) -> Result<HandshakeOutcome> {
        let state = std::mem::replace(&mut self.state, InitiatorState::Failed);

        match state {
            InitiatorState::Fresh {
                nonce,
                keypair,
                public_key,
            } => {
                let init = Message::HandshakeInit(HandshakeInit {
                    version: PROTOCOL_VERSION,
                    session_id: self.session_id.clone(),
                    public_key: public_key.to_vec(),
                    provider_nonce: nonce.clone(),
                    supported_ciphers: SUPPORTED_CIPHERS.iter().map(|s| (*s).to_string()).collect(),
                    supported_hashes: SUPPORTED_HASHES.iter().map(|s| (*s).to_string()).collect(),
                });

                self.state = InitiatorState::InitSent {
                    nonce,
                    keypair,
                    public_key,
                };
                debug!(session_id = %self.session_id, "handshake-init emitted");
                Ok(HandshakeOutcome::send(init))
            }
            other => {
                let err = CoreError::unexpected("start in Fresh state", other.label());
                drop(other);
                self.record_failure(&err);
                Err(err)
            }
        }
    }

    /// Processes one inbound message.
    ///
    /// # Errors
    /// Every error is terminal: the machine moves to `Failed`, secrets
    /// are dropped and zeroized, and the same error kind is returned
    /// for all later calls.
    pub fn handle(&mut self, msg: &Message) -> Result<HandshakeOutcome> {
        // Terminal states first: Failed replays the terminal error,
        // Confirmed ignores non-envelope traffic at this layer.
        match &self.state {
            InitiatorState::Failed => return Err(self.terminal(msg.type_name())),
            InitiatorState::Confirmed { .. } => {
                return Ok(HandshakeOutcome::quiet(HandshakeStatus::Confirmed));
            }
            _ => {}
        }

        let state = std::mem::replace(&mut self.state, InitiatorState::Failed);
        match self.transition(state, msg) {
            Ok((new_state, outcome)) => {
                self.state = new_state;
                Ok(outcome)
            }
            Err(err) => {
                self.record_failure(&err);
                Err(err)
            }
        }
    }

    /// Decodes raw transport bytes and processes the message.
    ///
    /// # Errors
    /// `MalformedMessage` on parse failure; otherwise as [`Self::handle`].
    pub fn handle_raw(&mut self, bytes: &[u8]) -> Result<HandshakeOutcome> {
        let msg = match crate::protocol::codec::decode_message(bytes) {
            Ok(msg) => msg,
            Err(err) => {
                self.record_failure(&err);
                return Err(err);
            }
        };
        self.handle(&msg)
    }

    fn transition(
        &mut self,
        state: InitiatorState,
        msg: &Message,
    ) -> Result<(InitiatorState, HandshakeOutcome)> {
        match (state, msg) {
            (
                InitiatorState::InitSent {
                    nonce,
                    keypair,
                    public_key,
                },
                Message::HandshakeResponse(response),
            ) => self.on_response(nonce, keypair, public_key, response),

            (
                InitiatorState::AwaitingConfirm {
                    nonce,
                    peer_nonce,
                    public_key,
                    peer_public,
                    keys,
                },
                Message::KeyConfirmation(confirmation),
            ) => Self::on_confirmation(
                &self.session_id,
                &nonce,
                &peer_nonce,
                &public_key,
                &peer_public,
                keys,
                confirmation,
            ),

            (state, msg) => Err(CoreError::unexpected(
                expected_for(&state),
                msg.type_name(),
            )),
        }
    }

    /// Handles `handshake-response`: verify session binding and the
    /// algorithm selection, run ECDH, derive keys, emit MAC_I.
    fn on_response(
        &self,
        nonce: Nonce,
        keypair: EphemeralKeyPair,
        public_key: [u8; P256_PUBLIC_KEY_SIZE],
        response: &HandshakeResponse,
    ) -> Result<(InitiatorState, HandshakeOutcome)> {
        if response.session_id != self.session_id {
            return Err(CoreError::SessionIdMismatch);
        }

        confirm_selection(&response.selected_cipher, &response.selected_hash)?;

        let shared = keypair.exchange(&response.public_key)?;
        let keys = derive_keys(&shared, &nonce, &response.consumer_nonce)?;

        // MAC_I lists the initiator's (sender's) half first
        let mac = confirmation_mac(
            &keys.confirmation,
            &nonce,
            &response.consumer_nonce,
            &public_key,
            &response.public_key,
        );

        let confirm = Message::KeyConfirmRequest(KeyConfirmRequest {
            confirmation_mac: mac.to_vec(),
            session_id: Some(self.session_id.clone()),
        });

        debug!(session_id = %self.session_id, "keys derived, key-confirmation-request emitted");

        Ok((
            InitiatorState::AwaitingConfirm {
                nonce,
                peer_nonce: response.consumer_nonce.clone(),
                public_key,
                peer_public: response.public_key.clone(),
                keys,
            },
            HandshakeOutcome::send(confirm),
        ))
    }

    /// Handles `key-confirmation`: check bindings, verify MAC_R.
    fn on_confirmation(
        session_id: &SessionId,
        nonce: &Nonce,
        peer_nonce: &Nonce,
        public_key: &[u8; P256_PUBLIC_KEY_SIZE],
        peer_public: &[u8],
        keys: DerivedKeys,
        confirmation: &KeyConfirmation,
    ) -> Result<(InitiatorState, HandshakeOutcome)> {
        if confirmation.session_id != *session_id {
            return Err(CoreError::SessionIdMismatch);
        }

        // The responder echoes its public key; a different key here is
        // the same severity as a session swap.
        if !ct_eq(&confirmation.public_key, peer_public) {
            return Err(CoreError::SessionIdMismatch);
        }

        // MAC_R lists the responder's (sender's) half first
        verify_confirmation_mac(
            &keys.confirmation,
            peer_nonce,
            nonce,
            peer_public,
            public_key,
            &confirmation.confirmation_mac,
        )?;

        info!(session_id = %session_id, "handshake confirmed (initiator)");

        Ok((
            InitiatorState::Confirmed { keys },
            HandshakeOutcome::quiet(HandshakeStatus::Confirmed),
        ))
    }

    /// Returns the confirmed encryption + authentication key pair.
    ///
    /// `None` until the handshake is confirmed. The confirmation key is
    /// never exposed.
    #[must_use]
    pub fn derived_keys(&self) -> Option<SessionKeys> {
        match &self.state {
            InitiatorState::Confirmed { keys } => Some(keys.session_keys()),
            _ => None,
        }
    }

    /// The session identifier generated at construction.
    #[must_use]
    pub const fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// `true` once both sides hold confirmed keys.
    #[must_use]
    pub const fn confirmed(&self) -> bool {
        matches!(self.state, InitiatorState::Confirmed { .. })
    }

    /// Tears the session down: zeroizes secrets, moves to `Failed`.
    ///
    /// Idempotent; all later operations return a terminal error.
    pub fn destroy(&mut self) {
        if !matches!(self.state, InitiatorState::Failed) {
            debug!(session_id = %self.session_id, "initiator destroyed");
        }
        // Dropping the state zeroizes nonces and keys on drop
        self.state = InitiatorState::Failed;
    }

    fn record_failure(&mut self, err: &CoreError) {
        warn!(session_id = %self.session_id, error = %err, "initiator handshake failed");
        self.state = InitiatorState::Failed;
        self.terminal_error = Some(err.clone());
    }

    fn terminal(&self, got: &str) -> CoreError {
        self.terminal_error
            .clone()
            .unwrap_or_else(|| CoreError::unexpected("nothing (session terminated)", got))
    }
}

impl std::fmt::Debug for Initiator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Initiator")
            .field("session_id", &self.session_id)
            .field("state", &self.state.label())
            .finish_non_exhaustive()
    }
}

const fn expected_for(state: &InitiatorState) -> &'static str {
    match state {
        InitiatorState::Fresh { .. } => "start() before any message",
        InitiatorState::InitSent { .. } => "handshake-response",
        InitiatorState::AwaitingConfirm { .. } => "key-confirmation",
        InitiatorState::Confirmed { .. } | InitiatorState::Failed => "nothing",
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_emits_init() {
        let mut initiator = Initiator::new().unwrap();
        let outcome = initiator.start().unwrap();

        assert_eq!(outcome.status, HandshakeStatus::InProgress);
        match outcome.outbound {
            Some(Message::HandshakeInit(init)) => {
                assert_eq!(init.version, PROTOCOL_VERSION);
                assert_eq!(&init.session_id, initiator.session_id());
                assert_eq!(init.public_key.len(), P256_PUBLIC_KEY_SIZE);
                assert_eq!(init.supported_ciphers, vec!["aes-256-gcm".to_string()]);
                assert_eq!(init.supported_hashes, vec!["sha256".to_string()]);
            }
            other => panic!("expected handshake-init, got {other:?}"),
        }
    }

    #[test]
    fn test_double_start_fails() {
        let mut initiator = Initiator::new().unwrap();
        initiator.start().unwrap();

        let result = initiator.start();
        assert!(matches!(result, Err(CoreError::UnexpectedMessage { .. })));
        assert!(!initiator.confirmed());
    }

    #[test]
    fn test_keys_hidden_before_confirm() {
        let mut initiator = Initiator::new().unwrap();
        assert!(initiator.derived_keys().is_none());

        initiator.start().unwrap();
        assert!(initiator.derived_keys().is_none());
    }

    #[test]
    fn test_unexpected_message_fails_session() {
        let mut initiator = Initiator::new().unwrap();
        initiator.start().unwrap();

        // A confirmation before the response is out of order
        let msg = Message::KeyConfirmation(KeyConfirmation {
            session_id: initiator.session_id().clone(),
            public_key: vec![0x04u8; 65],
            confirmation_mac: vec![0u8; 32],
        });

        let result = initiator.handle(&msg);
        assert!(matches!(result, Err(CoreError::UnexpectedMessage { .. })));

        // Terminal: the same error kind comes back on later calls
        let result = initiator.handle(&msg);
        assert!(matches!(result, Err(CoreError::UnexpectedMessage { .. })));
    }

    #[test]
    fn test_malformed_raw_fails_session() {
        let mut initiator = Initiator::new().unwrap();
        initiator.start().unwrap();

        let result = initiator.handle_raw(b"not-json{");
        assert!(matches!(result, Err(CoreError::MalformedMessage { .. })));
        assert!(initiator.derived_keys().is_none());
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut initiator = Initiator::new().unwrap();
        initiator.start().unwrap();

        initiator.destroy();
        initiator.destroy();

        assert!(!initiator.confirmed());
        assert!(initiator.derived_keys().is_none());

        let msg = Message::KeyConfirmRequest(KeyConfirmRequest {
            confirmation_mac: vec![0u8; 32],
            session_id: None,
        });
        assert!(initiator.handle(&msg).is_err());
    }
}
