// Integration tests for the SubtylSocket 4-message handshake and the
// post-handshake encrypted channel.

use subtyl_common::types::{Nonce, SessionId};
use subtyl_core::channel::SecureChannel;
use subtyl_core::crypto::kdf::hkdf_sha256;
use subtyl_core::error::CoreError;
use subtyl_core::handshake::{HandshakeStatus, Initiator, Responder};
use subtyl_core::protocol::messages::Message;

/// Helper: drive an honest handshake to completion, returning both
/// confirmed peers.
fn run_honest_handshake() -> (Initiator, Responder) {
    let mut initiator = Initiator::new().unwrap();
    let mut responder = Responder::new().unwrap();

    let init = initiator.start().unwrap().outbound.unwrap();
    let response = responder.handle(&init).unwrap().outbound.unwrap();
    let confirm_req = initiator.handle(&response).unwrap().outbound.unwrap();

    let outcome = responder.handle(&confirm_req).unwrap();
    assert_eq!(outcome.status, HandshakeStatus::Confirmed);
    let confirmation = outcome.outbound.unwrap();

    let outcome = initiator.handle(&confirmation).unwrap();
    assert_eq!(outcome.status, HandshakeStatus::Confirmed);
    assert!(outcome.outbound.is_none());

    (initiator, responder)
}

// ── S1: happy path ───────────────────────────────────────────────────────

#[test]
fn full_handshake_succeeds_with_matching_keys() {
    let (initiator, responder) = run_honest_handshake();

    assert!(initiator.confirmed());
    assert!(responder.confirmed());
    assert_eq!(responder.session_id(), Some(initiator.session_id()));

    let initiator_keys = initiator.derived_keys().unwrap();
    let responder_keys = responder.derived_keys().unwrap();

    // Key agreement: both sides hold byte-identical keys
    assert_eq!(
        initiator_keys.encryption.as_bytes(),
        responder_keys.encryption.as_bytes()
    );
    assert_eq!(
        initiator_keys.authentication.as_bytes(),
        responder_keys.authentication.as_bytes()
    );
}

#[test]
fn post_handshake_envelope_roundtrips() {
    let (initiator, responder) = run_honest_handshake();

    let sender = SecureChannel::new(initiator.derived_keys().unwrap());
    let receiver = SecureChannel::new(responder.derived_keys().unwrap());

    let envelope = sender.encrypt(b"hello").unwrap();

    // The envelope survives the JSON wire format
    let wire = serde_json::to_vec(&Message::EncryptedEnvelope(envelope)).unwrap();
    let parsed: Message = serde_json::from_slice(&wire).unwrap();
    let envelope = match parsed {
        Message::EncryptedEnvelope(env) => env,
        other => panic!("expected envelope, got {}", other.type_name()),
    };

    assert_eq!(receiver.decrypt(&envelope).unwrap(), b"hello");
}

#[test]
fn handshake_works_over_raw_json_bytes() {
    let mut initiator = Initiator::new().unwrap();
    let mut responder = Responder::new().unwrap();

    let encode = |msg: &Message| serde_json::to_vec(msg).unwrap();

    let init = initiator.start().unwrap().outbound.unwrap();
    let response = responder.handle_raw(&encode(&init)).unwrap().outbound.unwrap();
    let confirm_req = initiator
        .handle_raw(&encode(&response))
        .unwrap()
        .outbound
        .unwrap();
    let confirmation = responder
        .handle_raw(&encode(&confirm_req))
        .unwrap()
        .outbound
        .unwrap();
    initiator.handle_raw(&encode(&confirmation)).unwrap();

    assert!(initiator.confirmed() && responder.confirmed());
}

// ── S2: session swap ─────────────────────────────────────────────────────

#[test]
fn rewritten_session_id_in_response_rejected() {
    let mut initiator = Initiator::new().unwrap();
    let mut responder = Responder::new().unwrap();

    let init = initiator.start().unwrap().outbound.unwrap();
    let response = responder.handle(&init).unwrap().outbound.unwrap();

    // Attacker rewrites the session id before delivery
    let tampered = match response {
        Message::HandshakeResponse(mut resp) => {
            resp.session_id = SessionId::from_array([0xEEu8; 16]);
            Message::HandshakeResponse(resp)
        }
        other => panic!("expected handshake-response, got {}", other.type_name()),
    };

    let result = initiator.handle(&tampered);
    assert!(matches!(result, Err(CoreError::SessionIdMismatch)));
    assert!(!initiator.confirmed());
    assert!(initiator.derived_keys().is_none());
}

#[test]
fn rewritten_session_id_in_confirmation_rejected() {
    let mut initiator = Initiator::new().unwrap();
    let mut responder = Responder::new().unwrap();

    let init = initiator.start().unwrap().outbound.unwrap();
    let response = responder.handle(&init).unwrap().outbound.unwrap();
    let confirm_req = initiator.handle(&response).unwrap().outbound.unwrap();
    let confirmation = responder.handle(&confirm_req).unwrap().outbound.unwrap();

    let tampered = match confirmation {
        Message::KeyConfirmation(mut conf) => {
            conf.session_id = SessionId::from_array([0xEEu8; 16]);
            Message::KeyConfirmation(conf)
        }
        other => panic!("expected key-confirmation, got {}", other.type_name()),
    };

    let result = initiator.handle(&tampered);
    assert!(matches!(result, Err(CoreError::SessionIdMismatch)));
}

// ── S3: MAC tamper ───────────────────────────────────────────────────────

#[test]
fn tampered_confirmation_mac_rejected_by_responder() {
    let mut initiator = Initiator::new().unwrap();
    let mut responder = Responder::new().unwrap();

    let init = initiator.start().unwrap().outbound.unwrap();
    let response = responder.handle(&init).unwrap().outbound.unwrap();
    let confirm_req = initiator.handle(&response).unwrap().outbound.unwrap();

    let tampered = match confirm_req {
        Message::KeyConfirmRequest(mut req) => {
            req.confirmation_mac[0] ^= 0xFF;
            Message::KeyConfirmRequest(req)
        }
        other => panic!("expected key-confirmation-request, got {}", other.type_name()),
    };

    let result = responder.handle(&tampered);
    assert!(matches!(result, Err(CoreError::KeyConfirmationFailed)));
    assert!(responder.derived_keys().is_none());
}

// ── S4: version skew ─────────────────────────────────────────────────────

#[test]
fn version_skew_rejected_with_no_response() {
    let mut initiator = Initiator::new().unwrap();
    let mut responder = Responder::new().unwrap();

    let init = initiator.start().unwrap().outbound.unwrap();
    let skewed = match init {
        Message::HandshakeInit(mut msg) => {
            msg.version = 999;
            Message::HandshakeInit(msg)
        }
        other => panic!("expected handshake-init, got {}", other.type_name()),
    };

    let result = responder.handle(&skewed);
    assert!(matches!(
        result,
        Err(CoreError::UnsupportedVersion { got: 999, .. })
    ));
}

// ── S5: algorithm dearth ─────────────────────────────────────────────────

#[test]
fn unsupported_algorithms_rejected() {
    let mut initiator = Initiator::new().unwrap();
    let mut responder = Responder::new().unwrap();

    let init = initiator.start().unwrap().outbound.unwrap();
    let weak = match init {
        Message::HandshakeInit(mut msg) => {
            msg.supported_ciphers = vec!["weak-cipher".into()];
            msg.supported_hashes = vec!["md5".into()];
            Message::HandshakeInit(msg)
        }
        other => panic!("expected handshake-init, got {}", other.type_name()),
    };

    let result = responder.handle(&weak);
    assert!(matches!(result, Err(CoreError::UnsupportedAlgorithm { .. })));
}

// ── S6: malformed input ──────────────────────────────────────────────────

#[test]
fn malformed_bytes_rejected() {
    let mut responder = Responder::new().unwrap();

    let result = responder.handle_raw(b"not-json{");
    assert!(matches!(result, Err(CoreError::MalformedMessage { .. })));

    // The machine is dead afterwards
    let mut initiator = Initiator::new().unwrap();
    let init = initiator.start().unwrap().outbound.unwrap();
    assert!(responder.handle(&init).is_err());
}

// ── S7: HKDF length limit ────────────────────────────────────────────────

#[test]
fn hkdf_expand_length_boundary() {
    let ikm = [0x42u8; 32];

    assert!(hkdf_sha256(&ikm, b"salt", b"info", 8160).is_ok());

    let result = hkdf_sha256(&ikm, b"salt", b"info", 8161);
    assert!(matches!(result, Err(CoreError::LengthTooLarge { .. })));
}

// ── S8: AEAD tamper ──────────────────────────────────────────────────────

#[test]
fn tampered_envelope_ciphertext_rejected() {
    let (initiator, responder) = run_honest_handshake();

    let sender = SecureChannel::new(initiator.derived_keys().unwrap());
    let receiver = SecureChannel::new(responder.derived_keys().unwrap());

    let mut envelope = sender.encrypt(b"hello").unwrap();
    envelope.encrypted.data[0] ^= 0x01;

    let result = receiver.decrypt(&envelope);
    assert!(matches!(result, Err(CoreError::AeadTagMismatch)));
}

// ── Transcript binding ───────────────────────────────────────────────────

#[test]
fn responder_mac_replayed_as_initiator_mac_rejected() {
    // Let the responder confirm honestly, then feed its MAC_R back to
    // the initiator in place of MAC_R's legitimate carrier... the
    // interesting direction: hand the initiator a confirmation whose
    // MAC is the initiator's own MAC_I. Directional asymmetry must
    // reject it even though the key is right.
    let mut initiator = Initiator::new().unwrap();
    let mut responder = Responder::new().unwrap();

    let init = initiator.start().unwrap().outbound.unwrap();
    let response = responder.handle(&init).unwrap().outbound.unwrap();
    let confirm_req = initiator.handle(&response).unwrap().outbound.unwrap();

    let mac_i = match &confirm_req {
        Message::KeyConfirmRequest(req) => req.confirmation_mac.clone(),
        other => panic!("expected key-confirmation-request, got {}", other.type_name()),
    };

    let confirmation = responder.handle(&confirm_req).unwrap().outbound.unwrap();

    let swapped = match confirmation {
        Message::KeyConfirmation(mut conf) => {
            conf.confirmation_mac = mac_i;
            Message::KeyConfirmation(conf)
        }
        other => panic!("expected key-confirmation, got {}", other.type_name()),
    };

    let result = initiator.handle(&swapped);
    assert!(matches!(result, Err(CoreError::KeyConfirmationFailed)));
}

// ── Salt sensitivity end-to-end ──────────────────────────────────────────

#[test]
fn nonce_bit_flip_in_flight_causes_confirmation_failure() {
    let mut initiator = Initiator::new().unwrap();
    let mut responder = Responder::new().unwrap();

    let init = initiator.start().unwrap().outbound.unwrap();

    // Attacker flips one bit of the initiator nonce in flight; the two
    // sides now derive different key schedules from different salts.
    let flipped = match init {
        Message::HandshakeInit(mut msg) => {
            let mut bytes = *msg.provider_nonce.as_bytes();
            bytes[0] ^= 0x01;
            msg.provider_nonce = Nonce::from_array(bytes);
            Message::HandshakeInit(msg)
        }
        other => panic!("expected handshake-init, got {}", other.type_name()),
    };

    let response = responder.handle(&flipped).unwrap().outbound.unwrap();
    let confirm_req = initiator.handle(&response).unwrap().outbound.unwrap();

    // The responder's recomputed MAC_I cannot match
    let result = responder.handle(&confirm_req);
    assert!(matches!(result, Err(CoreError::KeyConfirmationFailed)));
}

// ── Lifecycle invariants ─────────────────────────────────────────────────

#[test]
fn keys_invisible_until_confirmed() {
    let mut initiator = Initiator::new().unwrap();
    let mut responder = Responder::new().unwrap();

    assert!(initiator.derived_keys().is_none());
    assert!(responder.derived_keys().is_none());

    let init = initiator.start().unwrap().outbound.unwrap();
    assert!(initiator.derived_keys().is_none());

    let response = responder.handle(&init).unwrap().outbound.unwrap();
    assert!(responder.derived_keys().is_none());

    let confirm_req = initiator.handle(&response).unwrap().outbound.unwrap();
    // Initiator has derived keys internally but must not expose them yet
    assert!(initiator.derived_keys().is_none());

    let confirmation = responder.handle(&confirm_req).unwrap().outbound.unwrap();
    assert!(responder.derived_keys().is_some());

    initiator.handle(&confirmation).unwrap();
    assert!(initiator.derived_keys().is_some());
}

#[test]
fn destroy_is_idempotent_and_terminal() {
    let (mut initiator, mut responder) = run_honest_handshake();

    initiator.destroy();
    initiator.destroy();
    responder.destroy();
    responder.destroy();

    assert!(!initiator.confirmed());
    assert!(!responder.confirmed());
    assert!(initiator.derived_keys().is_none());
    assert!(responder.derived_keys().is_none());
}

#[test]
fn confirmed_peer_ignores_stray_handshake_messages() {
    let (mut initiator, mut responder) = run_honest_handshake();

    let mut other = Initiator::new().unwrap();
    let stray = other.start().unwrap().outbound.unwrap();

    // Confirmed peers ignore non-envelope traffic at this layer
    let outcome = responder.handle(&stray).unwrap();
    assert_eq!(outcome.status, HandshakeStatus::Confirmed);
    assert!(outcome.outbound.is_none());

    let outcome = initiator.handle(&stray).unwrap();
    assert_eq!(outcome.status, HandshakeStatus::Confirmed);

    // Keys survive the stray traffic
    assert!(initiator.derived_keys().is_some());
    assert!(responder.derived_keys().is_some());
}

#[test]
fn sessions_derive_distinct_keys() {
    let (a_init, _) = run_honest_handshake();
    let (b_init, _) = run_honest_handshake();

    let a = a_init.derived_keys().unwrap();
    let b = b_init.derived_keys().unwrap();

    assert_ne!(a.encryption.as_bytes(), b.encryption.as_bytes());
}
