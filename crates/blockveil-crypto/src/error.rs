//! Error types for outer-layer cipher operations

use thiserror::Error;

/// Errors from the outer cipher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CipherError {
    /// Authentication tag did not verify.
    ///
    /// Expected when a decoder tries a candidate key that the sender did not
    /// use; also the outcome for tampered ciphertext or nonce.
    #[error("authentication failed")]
    AuthenticationFailure,
}

impl CipherError {
    /// Returns true if a different key may still succeed on the same input.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::AuthenticationFailure => true,
        }
    }
}
