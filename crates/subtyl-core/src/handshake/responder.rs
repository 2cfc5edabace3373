// ============================================
// File: crates/subtyl-core/src/handshake/responder.rs
// ============================================
//! # Responder State Machine
//!
//! ## Creation Reason
//! Consumer-side half of the handshake. Validates the Initiator's
//! version and algorithm offer, replies with its own key material,
//! then derives keys and exchanges confirmation MACs.
//!
//! ## State Progression
//! ```text
//! Fresh ──handshake-init──► InitRecv ──key-confirmation-request──► Confirmed
//! (any error, any state) ─────────────────────────────────────────► Failed
//! ```
//! The Responder derives keys only when MAC_I arrives; until then its
//! ephemeral private key stays unconsumed in the `InitRecv` payload.
//! Once `key-confirmation` has been emitted the Responder has verified
//! the peer, so emission and `Confirmed` coincide.
//!
//! ## Last Modified
//! v0.1.0 - Initial responder implementation

use tracing::{debug, info, warn};

use subtyl_common::types::{Nonce, SessionId};

use crate::crypto::handshake::{confirmation_mac, verify_confirmation_mac};
use crate::crypto::keys::EphemeralKeyPair;
use crate::crypto::schedule::{derive_keys, DerivedKeys, SessionKeys};
use crate::crypto::{rng, P256_PUBLIC_KEY_SIZE};
use crate::error::{CoreError, Result};
use crate::protocol::messages::{
    HandshakeInit, HandshakeResponse, KeyConfirmRequest, KeyConfirmation, Message,
};
use crate::protocol::version::{check_version, negotiate};

use super::{HandshakeOutcome, HandshakeStatus};

// ============================================
// ResponderState
// ============================================

/// Tagged state with one payload shape per state.
enum ResponderState {
    /// Constructed, waiting for `handshake-init`.
    Fresh {
        nonce: Nonce,
        keypair: EphemeralKeyPair,
        public_key: [u8; P256_PUBLIC_KEY_SIZE],
    },
    /// Response sent, waiting for MAC_I.
    InitRecv {
        nonce: Nonce,
        keypair: EphemeralKeyPair,
        public_key: [u8; P256_PUBLIC_KEY_SIZE],
        peer_nonce: Nonce,
        peer_public: Vec<u8>,
    },
    /// Handshake complete; keys installed.
    Confirmed { keys: DerivedKeys },
    /// Terminal failure; secrets already dropped.
    Failed,
}

impl ResponderState {
    const fn label(&self) -> &'static str {
        match self {
            Self::Fresh { .. } => "Fresh",
            Self::InitRecv { .. } => "InitRecv",
            Self::Confirmed { .. } => "Confirmed",
            Self::Failed => "Failed",
        }
    }
}

// ============================================
// Responder
// ============================================

/// Consumer-side handshake peer.
///
/// Lives exactly one handshake. The session id is learned from the
/// Initiator's opening message and bound from then on.
pub struct Responder {
    session_id: Option<SessionId>,
    state: ResponderState,
    terminal_error: Option<CoreError>,
}

impl Responder {
    /// Creates a fresh Responder with a new nonce and ephemeral key
    /// pair.
    ///
    /// # Errors
    /// Returns `InsufficientEntropy` if the CSPRNG sanity check fails.
    pub fn new() -> Result<Self> {
        let nonce = rng::generate_nonce()?;
        let keypair = EphemeralKeyPair::generate();
        let public_key = keypair.public_key_bytes();

        debug!("responder created");

        Ok(Self {
            session_id: None,
            state: ResponderState::Fresh {
                nonce,
                keypair,
                public_key,
            },
            terminal_error: None,
        })
    }

    /// Processes one inbound message.
    ///
    /// # Errors
    /// Every error is terminal: the machine moves to `Failed`, secrets
    /// are dropped and zeroized, and the same error kind is returned
    /// for all later calls.
    pub fn handle(&mut self, msg: &Message) -> Result<HandshakeOutcome> {
        match &self.state {
            ResponderState::Failed => return Err(self.terminal(msg.type_name())),
            ResponderState::Confirmed { .. } => {
                return Ok(HandshakeOutcome::quiet(HandshakeStatus::Confirmed));
            }
            _ => {}
        }

        let state = std::mem::replace(&mut self.state, ResponderState::Failed);
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
        state: ResponderState,
        msg: &Message,
    ) -> Result<(ResponderState, HandshakeOutcome)> {
        match (state, msg) {
            (
                ResponderState::Fresh {
                    nonce,
                    keypair,
                    public_key,
                },
                Message::HandshakeInit(init),
            ) => self.on_init(nonce, keypair, public_key, init),

            (
                ResponderState::InitRecv {
                    nonce,
                    keypair,
                    public_key,
                    peer_nonce,
                    peer_public,
                },
                Message::KeyConfirmRequest(request),
            ) => self.on_confirm_request(nonce, keypair, public_key, peer_nonce, peer_public, request),

            (state, msg) => Err(CoreError::unexpected(
                expected_for(&state),
                msg.type_name(),
            )),
        }
    }

    /// Handles `handshake-init`: verify version, negotiate algorithms,
    /// bind the session id, emit the response.
    fn on_init(
        &mut self,
        nonce: Nonce,
        keypair: EphemeralKeyPair,
        public_key: [u8; P256_PUBLIC_KEY_SIZE],
        init: &HandshakeInit,
    ) -> Result<(ResponderState, HandshakeOutcome)> {
        check_version(init.version)?;

        let (cipher, hash) = negotiate(&init.supported_ciphers, &init.supported_hashes)?;

        self.session_id = Some(init.session_id.clone());

        let response = Message::HandshakeResponse(HandshakeResponse {
            session_id: init.session_id.clone(),
            public_key: public_key.to_vec(),
            consumer_nonce: nonce.clone(),
            selected_cipher: cipher.to_string(),
            selected_hash: hash.to_string(),
        });

        debug!(session_id = %init.session_id, "handshake-response emitted");

        Ok((
            ResponderState::InitRecv {
                nonce,
                keypair,
                public_key,
                peer_nonce: init.provider_nonce.clone(),
                peer_public: init.public_key.clone(),
            },
            HandshakeOutcome::send(response),
        ))
    }

    /// Handles `key-confirmation-request`: run ECDH, derive keys,
    /// verify MAC_I, emit MAC_R.
    fn on_confirm_request(
        &mut self,
        nonce: Nonce,
        keypair: EphemeralKeyPair,
        public_key: [u8; P256_PUBLIC_KEY_SIZE],
        peer_nonce: Nonce,
        peer_public: Vec<u8>,
        request: &KeyConfirmRequest,
    ) -> Result<(ResponderState, HandshakeOutcome)> {
        let session_id = self
            .session_id
            .clone()
            .ok_or(CoreError::SessionIdMismatch)?;

        // The session id is optional on this message; when present it
        // must match the bound one.
        if let Some(claimed) = &request.session_id {
            if *claimed != session_id {
                return Err(CoreError::SessionIdMismatch);
            }
        }

        let shared = keypair.exchange(&peer_public)?;
        let keys = derive_keys(&shared, &peer_nonce, &nonce)?;

        // MAC_I lists the initiator's (sender's) half first
        verify_confirmation_mac(
            &keys.confirmation,
            &peer_nonce,
            &nonce,
            &peer_public,
            &public_key,
            &request.confirmation_mac,
        )?;

        // MAC_R lists the responder's (sender's) half first
        let mac = confirmation_mac(&keys.confirmation, &nonce, &peer_nonce, &public_key, &peer_public);

        let confirmation = Message::KeyConfirmation(KeyConfirmation {
            session_id: session_id.clone(),
            public_key: public_key.to_vec(),
            confirmation_mac: mac.to_vec(),
        });

        info!(session_id = %session_id, "handshake confirmed (responder)");

        Ok((
            ResponderState::Confirmed { keys },
            HandshakeOutcome::send_confirmed(confirmation),
        ))
    }

    /// Returns the confirmed encryption + authentication key pair.
    ///
    /// `None` until the handshake is confirmed. The confirmation key is
    /// never exposed.
    #[must_use]
    pub fn derived_keys(&self) -> Option<SessionKeys> {
        match &self.state {
            ResponderState::Confirmed { keys } => Some(keys.session_keys()),
            _ => None,
        }
    }

    /// The session identifier learned from `handshake-init`, if any.
    #[must_use]
    pub const fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// `true` once both sides hold confirmed keys.
    #[must_use]
    pub const fn confirmed(&self) -> bool {
        matches!(self.state, ResponderState::Confirmed { .. })
    }

    /// Tears the session down: zeroizes secrets, moves to `Failed`.
    ///
    /// Idempotent; all later operations return a terminal error.
    pub fn destroy(&mut self) {
        if !matches!(self.state, ResponderState::Failed) {
            debug!("responder destroyed");
        }
        // Dropping the state zeroizes nonces and keys on drop
        self.state = ResponderState::Failed;
    }

    fn record_failure(&mut self, err: &CoreError) {
        warn!(error = %err, "responder handshake failed");
        self.state = ResponderState::Failed;
        self.terminal_error = Some(err.clone());
    }

    fn terminal(&self, got: &str) -> CoreError {
        self.terminal_error
            .clone()
            .unwrap_or_else(|| CoreError::unexpected("nothing (session terminated)", got))
    }
}

impl std::fmt::Debug for Responder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Responder")
            .field("session_id", &self.session_id)
            .field("state", &self.state.label())
            .finish_non_exhaustive()
    }
}

const fn expected_for(state: &ResponderState) -> &'static str {
    match state {
        ResponderState::Fresh { .. } => "handshake-init",
        ResponderState::InitRecv { .. } => "key-confirmation-request",
        ResponderState::Confirmed { .. } | ResponderState::Failed => "nothing",
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::version::PROTOCOL_VERSION;

    fn sample_init(version: u32, ciphers: &[&str], hashes: &[&str]) -> Message {
        Message::HandshakeInit(HandshakeInit {
            version,
            session_id: SessionId::from_array([0x11u8; 16]),
            public_key: vec![0x04u8; 65],
            provider_nonce: Nonce::from_array([0x22u8; 32]),
            supported_ciphers: ciphers.iter().map(|s| (*s).to_string()).collect(),
            supported_hashes: hashes.iter().map(|s| (*s).to_string()).collect(),
        })
    }

    #[test]
    fn test_init_produces_response() {
        let mut responder = Responder::new().unwrap();
        assert!(responder.session_id().is_none());

        let outcome = responder
            .handle(&sample_init(PROTOCOL_VERSION, &["aes-256-gcm"], &["sha256"]))
            .unwrap();

        assert_eq!(outcome.status, HandshakeStatus::InProgress);
        match outcome.outbound {
            Some(Message::HandshakeResponse(resp)) => {
                assert_eq!(resp.selected_cipher, "aes-256-gcm");
                assert_eq!(resp.selected_hash, "sha256");
                assert_eq!(resp.public_key.len(), P256_PUBLIC_KEY_SIZE);
                assert_eq!(Some(&resp.session_id), responder.session_id());
            }
            other => panic!("expected handshake-response, got {other:?}"),
        }
    }

    #[test]
    fn test_version_skew_rejected_without_response() {
        let mut responder = Responder::new().unwrap();

        let result = responder.handle(&sample_init(999, &["aes-256-gcm"], &["sha256"]));
        assert!(matches!(
            result,
            Err(CoreError::UnsupportedVersion { got: 999, .. })
        ));
        assert!(responder.session_id().is_none());
    }

    #[test]
    fn test_algorithm_dearth_rejected() {
        let mut responder = Responder::new().unwrap();

        let result = responder.handle(&sample_init(PROTOCOL_VERSION, &["weak-cipher"], &["md5"]));
        assert!(matches!(result, Err(CoreError::UnsupportedAlgorithm { .. })));
    }

    #[test]
    fn test_confirm_request_before_init_rejected() {
        let mut responder = Responder::new().unwrap();

        let msg = Message::KeyConfirmRequest(KeyConfirmRequest {
            confirmation_mac: vec![0u8; 32],
            session_id: None,
        });
        let result = responder.handle(&msg);
        assert!(matches!(result, Err(CoreError::UnexpectedMessage { .. })));
    }

    #[test]
    fn test_keys_hidden_before_confirm() {
        let mut responder = Responder::new().unwrap();
        assert!(responder.derived_keys().is_none());

        responder
            .handle(&sample_init(PROTOCOL_VERSION, &["aes-256-gcm"], &["sha256"]))
            .unwrap();
        assert!(responder.derived_keys().is_none());
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut responder = Responder::new().unwrap();
        responder.destroy();
        responder.destroy();

        assert!(!responder.confirmed());
        let result = responder.handle(&sample_init(PROTOCOL_VERSION, &["aes-256-gcm"], &["sha256"]));
        assert!(result.is_err());
    }
}
