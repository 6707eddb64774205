//! Transport key material

use std::fmt;

use zeroize::Zeroize;

/// Size of a transport key (256 bits)
pub const KEY_SIZE: usize = 32;

/// A key derived from one block header.
///
/// Used for a single encrypt or decrypt attempt and then discarded. Not
/// `Clone`: each attempt derives its own copy, and the bytes are zeroized on
/// drop.
pub struct TransportKey {
    /// The 32-byte symmetric key for XChaCha20-Poly1305
    key: [u8; KEY_SIZE],
    /// Hash of the block this key was derived from
    derived_from: [u8; 32],
}

impl TransportKey {
    pub(crate) fn new(key: [u8; KEY_SIZE], derived_from: [u8; 32]) -> Self {
        Self { key, derived_from }
    }

    /// 32-byte symmetric key for XChaCha20-Poly1305 AEAD.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }

    /// Hash of the block header this key was derived from.
    pub fn derived_from(&self) -> &[u8; 32] {
        &self.derived_from
    }
}

impl fmt::Debug for TransportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportKey")
            .field("key", &"<redacted>")
            .field("derived_from", &self.derived_from)
            .finish()
    }
}

impl Drop for TransportKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}
