//! Error types for envelope parsing and the padding codec.

use thiserror::Error;

/// Result alias for envelope operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Envelope framing errors.
///
/// All of these indicate malformed or hostile input (or a local bug when
/// encoding) and are never retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Buffer shorter than the fixed envelope header
    #[error("envelope too short: expected at least {expected} bytes, got {actual}")]
    EnvelopeTooShort {
        /// Minimum number of bytes required
        expected: usize,
        /// Bytes actually available
        actual: usize,
    },

    /// Version byte not understood by this implementation
    #[error("unsupported envelope version: {0:#04x}")]
    UnsupportedVersion(u8),

    /// Reserved flag bits were set
    #[error("unsupported envelope flags: {0:#04x}")]
    UnsupportedFlags(u8),

    /// Declared content length exceeds the largest padded ciphertext
    #[error("content too large: {size} bytes (max {max})")]
    ContentTooLarge {
        /// Declared content size
        size: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Declared content length cannot hold an authentication tag
    #[error("content too short: {size} bytes (min {min})")]
    ContentTooShort {
        /// Declared content size
        size: usize,
        /// Minimum required
        min: usize,
    },

    /// Buffer ends before the declared recipient reference and content
    #[error("envelope truncated: expected {expected} body bytes, got {actual}")]
    Truncated {
        /// Body bytes declared by the header
        expected: usize,
        /// Body bytes actually present
        actual: usize,
    },

    /// Bytes follow the declared content
    #[error("{0} trailing bytes after envelope content")]
    TrailingBytes(usize),

    /// Recipient reference does not fit the 16-bit length field
    #[error("recipient reference too long: {len} bytes (max {max})")]
    RecipientTooLong {
        /// Actual length
        len: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Block hash text was not 64 hex characters
    #[error("invalid block hash: {0}")]
    InvalidBlockHash(String),
}

/// Padding codec errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaddingError {
    /// Payload does not fit the largest bucket
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Payload size
        size: usize,
        /// Largest payload that fits a bucket
        max: usize,
    },

    /// Padded buffer is inconsistent with its bucket
    #[error("padding corrupt: {reason}")]
    Corrupt {
        /// What was inconsistent
        reason: String,
    },
}

impl PaddingError {
    /// Returns true if the error was caused by the local caller rather than
    /// by received bytes.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::PayloadTooLarge { .. })
    }
}
