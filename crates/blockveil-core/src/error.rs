//! Error types for the blockveil engine.
//!
//! Only these errors cross the engine boundary. A candidate key failing to
//! authenticate is not an error at this level: the decode loop absorbs it and
//! moves on to the next candidate.

use blockveil_proto::{PaddingError, ProtocolError};
use thiserror::Error;

/// Errors surfaced by [`crate::ProtocolEngine`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The header window is empty; nothing to derive an encode key from
    #[error("no block header available")]
    NoHeaderAvailable,

    /// Payload does not fit the largest padding bucket
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Payload size
        size: usize,
        /// Largest accepted payload
        max: usize,
    },

    /// Authenticated plaintext had an inconsistent padding layout
    #[error("padding corrupt: {reason}")]
    PaddingCorrupt {
        /// What was inconsistent
        reason: String,
    },

    /// Wire bytes did not parse as an envelope
    #[error("malformed frame: {0}")]
    MalformedFrame(#[from] ProtocolError),

    /// No candidate key authenticated the envelope
    #[error("decryption exhausted after {attempts} candidate keys")]
    DecryptionExhausted {
        /// Candidate keys tried; zero when the referenced header is unknown
        attempts: usize,
    },
}

impl EngineError {
    /// Returns true if the same input may succeed once the header window
    /// advances.
    ///
    /// An empty window fills on the next header. An envelope referencing an
    /// unknown header (`attempts == 0`) may come from a sender ahead of us.
    /// Once candidates were actually tried and failed, retrying cannot help.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NoHeaderAvailable | Self::DecryptionExhausted { attempts: 0 })
    }
}

impl From<PaddingError> for EngineError {
    fn from(err: PaddingError) -> Self {
        match err {
            PaddingError::PayloadTooLarge { size, max } => Self::PayloadTooLarge { size, max },
            PaddingError::Corrupt { reason } => Self::PaddingCorrupt { reason },
        }
    }
}
