//! Detached Ed25519 signature verification for challenge responses.
//!
//! Clients supply the public key and signature as base64 strings in whatever
//! shape their tooling emits: standard or url-safe alphabet, padded or not.
//! Decoding normalizes the alphabet and pads before decoding, then enforces
//! the exact byte lengths the scheme requires. Any decode or length failure
//! verifies as false; callers never learn which step rejected the input.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};

pub const PUBLIC_KEY_LENGTH: usize = 32;
pub const SIGNATURE_LENGTH: usize = 64;

/// Verify a detached signature over `message` (the literal challenge code,
/// UTF-8 encoded) against the claimed public key. Fails closed.
#[must_use]
pub fn verify_detached(message: &str, public_key: &str, signature: &str) -> bool {
    let Some(key_bytes) = decode_flexible(public_key, PUBLIC_KEY_LENGTH) else {
        return false;
    };
    let Some(sig_bytes) = decode_flexible(signature, SIGNATURE_LENGTH) else {
        return false;
    };

    let key_bytes: [u8; PUBLIC_KEY_LENGTH] = match key_bytes.try_into() {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let sig_bytes: [u8; SIGNATURE_LENGTH] = match sig_bytes.try_into() {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let Ok(verifying_key) = VerifyingKey::from_bytes(&key_bytes) else {
        return false;
    };
    let signature = Signature::from_bytes(&sig_bytes);

    verifying_key
        .verify(message.as_bytes(), &signature)
        .is_ok()
}

/// Decode base64 in either alphabet, padded or not, and require an exact
/// decoded length.
fn decode_flexible(value: &str, expected_len: usize) -> Option<Vec<u8>> {
    let mut normalized = value.trim().replace('-', "+").replace('_', "/");
    while normalized.len() % 4 != 0 {
        normalized.push('=');
    }

    let decoded = STANDARD.decode(normalized).ok()?;
    if decoded.len() == expected_len {
        Some(decoded)
    } else {
        None
    }
}
