//! Opaque recipient routing hint.

use bytes::Bytes;

use crate::errors::{ProtocolError, Result};

/// Routing hint for the inner layer.
///
/// The outer layer never interprets these bytes. Typically a short recipient
/// tag or public key fingerprint chosen by the inner-layer collaborator.
/// Empty is allowed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RecipientRef(Bytes);

impl RecipientRef {
    /// Longest reference the 16-bit length field can carry.
    pub const MAX_LEN: usize = u16::MAX as usize;

    /// Wrap routing bytes.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::RecipientTooLong` if longer than [`Self::MAX_LEN`]
    pub fn new(bytes: impl Into<Bytes>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.len() > Self::MAX_LEN {
            return Err(ProtocolError::RecipientTooLong { len: bytes.len(), max: Self::MAX_LEN });
        }
        Ok(Self(bytes))
    }

    /// Empty reference (broadcast-style envelopes).
    #[must_use]
    pub fn empty() -> Self {
        Self(Bytes::new())
    }

    /// Raw reference bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the reference carries no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
