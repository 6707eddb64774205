//! Fixed envelope header with zero-copy parsing.
//!
//! The header is a 64-byte structure serialized as raw binary (Big Endian),
//! followed by the variable-length recipient reference and content.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::errors::{ProtocolError, Result};

/// Fixed 64-byte envelope header (Big Endian network byte order)
///
/// Fields are stored as raw byte arrays to avoid alignment issues. The whole
/// header fits one 64-byte cache line.
///
/// # Security
///
/// The #[repr(C, packed)] layout with zerocopy traits ensures this struct can
/// be safely cast from untrusted network bytes - all 64-byte patterns are
/// valid. There is deliberately no magic number: apart from the version byte
/// and lengths, the envelope should look like random bytes.
#[repr(C, packed)]
#[derive(Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub(crate) struct EnvelopeHeader {
    // Framing (8 bytes: 0-7)
    version: u8,             // 0x01
    flags: u8,               // reserved, must be zero
    recipient_len: [u8; 2],  // u16 recipient reference length
    content_len: [u8; 4],    // u32 ciphertext ‖ tag length

    // Key selection (32 bytes: 8-39)
    header_ref: [u8; 32], // hash of the block whose key sealed the content

    // AEAD (24 bytes: 40-63)
    nonce: [u8; 24], // XChaCha20 nonce
}

impl EnvelopeHeader {
    /// Size of the serialized header (64 bytes)
    pub(crate) const SIZE: usize = 64;

    /// Current envelope version
    pub(crate) const VERSION: u8 = 0x01;

    pub(crate) fn new(
        header_ref: [u8; 32],
        nonce: [u8; 24],
        recipient_len: u16,
        content_len: u32,
    ) -> Self {
        Self {
            version: Self::VERSION,
            flags: 0,
            recipient_len: recipient_len.to_be_bytes(),
            content_len: content_len.to_be_bytes(),
            header_ref,
            nonce,
        }
    }

    /// Parse header from network bytes (zero-copy, safe)
    ///
    /// Validates version and flags only. Length limits are checked by the
    /// envelope, which knows the content bounds.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::EnvelopeTooShort` if buffer is shorter than 64 bytes
    /// - `ProtocolError::UnsupportedVersion` if version byte is unknown
    /// - `ProtocolError::UnsupportedFlags` if reserved flags are set
    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<&Self> {
        let header = Self::ref_from_prefix(bytes)
            .map_err(|_| ProtocolError::EnvelopeTooShort {
                expected: Self::SIZE,
                actual: bytes.len(),
            })?
            .0;

        if header.version != Self::VERSION {
            return Err(ProtocolError::UnsupportedVersion(header.version));
        }

        if header.flags != 0 {
            return Err(ProtocolError::UnsupportedFlags(header.flags));
        }

        Ok(header)
    }

    /// Serialize header to bytes (zero-copy)
    pub(crate) fn to_bytes(self) -> [u8; Self::SIZE] {
        let mut arr = [0u8; Self::SIZE];
        arr.copy_from_slice(IntoBytes::as_bytes(&self));
        arr
    }

    pub(crate) fn recipient_len(&self) -> usize {
        u16::from_be_bytes(self.recipient_len) as usize
    }

    pub(crate) fn content_len(&self) -> usize {
        u32::from_be_bytes(self.content_len) as usize
    }

    pub(crate) fn header_ref(&self) -> [u8; 32] {
        self.header_ref
    }

    pub(crate) fn nonce(&self) -> [u8; 24] {
        self.nonce
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_one_cache_line() {
        assert_eq!(std::mem::size_of::<EnvelopeHeader>(), EnvelopeHeader::SIZE);
    }

    #[test]
    fn field_offsets() {
        let header = EnvelopeHeader::new([0x11; 32], [0x22; 24], 0x0102, 0x0304_0506);
        let bytes = header.to_bytes();

        assert_eq!(bytes[0], EnvelopeHeader::VERSION);
        assert_eq!(bytes[1], 0);
        assert_eq!(&bytes[2..4], &[0x01, 0x02]);
        assert_eq!(&bytes[4..8], &[0x03, 0x04, 0x05, 0x06]);
        assert_eq!(&bytes[8..40], &[0x11; 32]);
        assert_eq!(&bytes[40..64], &[0x22; 24]);
    }

    #[test]
    fn parse_round_trip() {
        let header = EnvelopeHeader::new([0xAA; 32], [0xBB; 24], 7, 1040);
        let bytes = header.to_bytes();

        let parsed = EnvelopeHeader::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.recipient_len(), 7);
        assert_eq!(parsed.content_len(), 1040);
        assert_eq!(parsed.header_ref(), [0xAA; 32]);
        assert_eq!(parsed.nonce(), [0xBB; 24]);
    }

    #[test]
    fn serializing_leaves_header_usable() {
        let header = EnvelopeHeader::new([0x31; 32], [0x32; 24], 3, 1040);
        let first = header.to_bytes();
        let second = header.to_bytes();

        assert_eq!(first, second);
        assert_eq!(header.content_len(), 1040);
    }

    #[test]
    fn reject_short_buffer() {
        let result = EnvelopeHeader::from_bytes(&[0x01; 63]);
        assert!(matches!(
            result,
            Err(ProtocolError::EnvelopeTooShort { expected: 64, actual: 63 })
        ));
    }

    #[test]
    fn reject_unknown_version() {
        let mut bytes = EnvelopeHeader::new([0; 32], [0; 24], 0, 16).to_bytes();
        bytes[0] = 0x02;

        assert!(matches!(
            EnvelopeHeader::from_bytes(&bytes),
            Err(ProtocolError::UnsupportedVersion(0x02))
        ));
    }

    #[test]
    fn reject_reserved_flags() {
        let mut bytes = EnvelopeHeader::new([0; 32], [0; 24], 0, 16).to_bytes();
        bytes[1] = 0x80;

        assert!(matches!(
            EnvelopeHeader::from_bytes(&bytes),
            Err(ProtocolError::UnsupportedFlags(0x80))
        ));
    }
}
