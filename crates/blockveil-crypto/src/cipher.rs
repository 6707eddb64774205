//! Outer-layer encryption using `XChaCha20-Poly1305`
//!
//! All functions are pure - the nonce must be provided by the caller.
//! This enables deterministic testing and keeps randomness behind the
//! caller's environment.

use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit, Payload},
};

use crate::{error::CipherError, key::TransportKey};

/// Size of the `XChaCha20` nonce (24 bytes)
pub const NONCE_SIZE: usize = 24;

/// Poly1305 tag size (16 bytes), appended to every ciphertext
pub const TAG_SIZE: usize = 16;

/// Encrypt a padded payload under a transport key.
///
/// Returns `ciphertext ‖ tag`, exactly `payload.len() + TAG_SIZE` bytes.
/// `aad` is authenticated but not encrypted; decryption must present the
/// same bytes.
///
/// # Security
///
/// - Caller MUST provide a fresh nonce per message; reuse under the same
///   block key breaks confidentiality of both messages
/// - Authenticated encryption prevents tampering
pub fn encrypt(
    key: &TransportKey,
    nonce: &[u8; NONCE_SIZE],
    aad: &[u8],
    payload: &[u8],
) -> Vec<u8> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());

    let Ok(ciphertext) = cipher.encrypt(XNonce::from_slice(nonce), Payload { msg: payload, aad })
    else {
        unreachable!("XChaCha20-Poly1305 encryption cannot fail below the 256 GiB message limit");
    };

    ciphertext
}

/// Decrypt `ciphertext ‖ tag` under a transport key.
///
/// # Errors
///
/// - `AuthenticationFailure`: wrong key, tampered ciphertext, nonce or
///   associated data, or input shorter than a tag. Tag comparison is
///   constant-time.
pub fn decrypt(
    key: &TransportKey,
    nonce: &[u8; NONCE_SIZE],
    aad: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CipherError> {
    if ciphertext.len() < TAG_SIZE {
        return Err(CipherError::AuthenticationFailure);
    }

    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());

    cipher
        .decrypt(XNonce::from_slice(nonce), Payload { msg: ciphertext, aad })
        .map_err(|_| CipherError::AuthenticationFailure)
}
