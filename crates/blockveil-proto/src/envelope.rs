//! Wire envelope combining header reference, nonce, and ciphertext.
//!
//! An `Envelope` is the unit handed to the transport layer:
//! - 64-byte raw binary header (Big Endian)
//! - recipient reference (opaque routing hint)
//! - content: padded payload encrypted under the referenced block's key,
//!   with the 16-byte authentication tag appended
//!
//! This is pure serialization. Key selection and decryption live in the
//! engine.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{
    BlockHash, RecipientRef,
    errors::{ProtocolError, Result},
    header::EnvelopeHeader,
    padding::PaddingBucket,
};

/// Outer-layer message envelope
///
/// Layout on the wire:
/// `[EnvelopeHeader: 64 bytes] + [recipient_ref] + [content]`
///
/// # Invariants
///
/// - Content Bounds: `content.len()` lies within
///   [`Envelope::MIN_CONTENT_SIZE`, `Envelope::MAX_CONTENT_SIZE`]. Enforced by
///   [`Envelope::encode`] and [`Envelope::decode`].
///
/// - Exact Size: decode consumes the entire buffer; trailing bytes are
///   rejected so one wire message maps to exactly one envelope.
///
/// # Security
///
/// Provides structural validity only. The header reference and recipient
/// reference travel in the clear; the engine binds them to the AEAD tag
/// through [`Envelope::associated_data`], so rewriting either in transit
/// makes the content fail to authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Block whose transport key sealed the content
    pub header_ref: BlockHash,

    /// Routing hint for the inner layer
    pub recipient_ref: RecipientRef,

    /// `XChaCha20` nonce
    pub nonce: [u8; Self::NONCE_SIZE],

    /// Ciphertext with the authentication tag appended
    pub content: Bytes,
}

impl Envelope {
    /// Nonce length carried in the header (24 bytes)
    pub const NONCE_SIZE: usize = 24;

    /// Authentication tag length appended to the content (16 bytes)
    pub const TAG_SIZE: usize = 16;

    /// Fixed header size (64 bytes)
    pub const HEADER_SIZE: usize = EnvelopeHeader::SIZE;

    /// Smallest content that can carry a tag
    pub const MIN_CONTENT_SIZE: usize = Self::TAG_SIZE;

    /// Largest content: the 1 MiB bucket plus its tag
    pub const MAX_CONTENT_SIZE: usize = PaddingBucket::Mib1.size() + Self::TAG_SIZE;

    /// Assemble an envelope from its parts.
    ///
    /// Bounds are checked when encoding, so envelopes can be built freely in
    /// tests.
    #[must_use]
    pub fn new(
        header_ref: BlockHash,
        recipient_ref: RecipientRef,
        nonce: [u8; Self::NONCE_SIZE],
        content: impl Into<Bytes>,
    ) -> Self {
        Self { header_ref, recipient_ref, nonce, content: content.into() }
    }

    /// Bytes authenticated (not encrypted) alongside the content:
    /// `header_ref ‖ recipient_ref`.
    ///
    /// `header_ref` has a fixed length, so the concatenation is unambiguous.
    #[must_use]
    pub fn associated_data(header_ref: &BlockHash, recipient_ref: &RecipientRef) -> Vec<u8> {
        let mut aad = Vec::with_capacity(BlockHash::SIZE + recipient_ref.len());
        aad.extend_from_slice(header_ref.as_bytes());
        aad.extend_from_slice(recipient_ref.as_bytes());
        aad
    }

    /// Total encoded size in bytes.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        Self::HEADER_SIZE + self.recipient_ref.len() + self.content.len()
    }

    /// Encode envelope into buffer
    ///
    /// Writes: `[header (64 bytes)] + [recipient_ref] + [content]`
    ///
    /// # Errors
    ///
    /// - `ProtocolError::ContentTooLarge` / `ContentTooShort` if content is
    ///   outside the allowed bounds
    pub fn encode(&self, dst: &mut impl BufMut) -> Result<()> {
        let content_len = check_content_len(self.content.len())?;

        // INVARIANT: RecipientRef::new caps length at u16::MAX
        let recipient_len = self.recipient_ref.len() as u16;

        let header = EnvelopeHeader::new(
            *self.header_ref.as_bytes(),
            self.nonce,
            recipient_len,
            content_len,
        );

        dst.put_slice(&header.to_bytes());
        dst.put_slice(self.recipient_ref.as_bytes());
        dst.put_slice(&self.content);

        Ok(())
    }

    /// Encode into a freshly allocated buffer.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode(&mut buf)?;
        Ok(buf.freeze())
    }

    /// Decode envelope from wire format
    ///
    /// # Errors
    ///
    /// - `ProtocolError` if header parsing fails (short buffer, version, flags)
    /// - `ProtocolError::ContentTooLarge` / `ContentTooShort` for out-of-range
    ///   content length
    /// - `ProtocolError::Truncated` if the body is shorter than declared
    /// - `ProtocolError::TrailingBytes` if the body is longer than declared
    ///
    /// # Security
    ///
    /// - Fail Fast: lengths are validated before copying any body bytes.
    /// - Bounded: content length is capped at the largest bucket plus tag, so
    ///   a hostile header cannot request a large allocation.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let header = EnvelopeHeader::from_bytes(bytes)?;

        let recipient_len = header.recipient_len();
        let content_len = header.content_len();
        check_content_len(content_len)?;

        let body = bytes.get(EnvelopeHeader::SIZE..).unwrap_or_default();
        let expected = recipient_len + content_len;

        if body.len() < expected {
            return Err(ProtocolError::Truncated { expected, actual: body.len() });
        }
        if body.len() > expected {
            return Err(ProtocolError::TrailingBytes(body.len() - expected));
        }

        let (recipient, content) = body.split_at(recipient_len);
        debug_assert_eq!(content.len(), content_len);

        Ok(Self {
            header_ref: BlockHash::from_bytes(header.header_ref()),
            recipient_ref: RecipientRef::new(Bytes::copy_from_slice(recipient))?,
            nonce: header.nonce(),
            content: Bytes::copy_from_slice(content),
        })
    }
}

fn check_content_len(len: usize) -> Result<u32> {
    if len < Envelope::MIN_CONTENT_SIZE {
        return Err(ProtocolError::ContentTooShort { size: len, min: Envelope::MIN_CONTENT_SIZE });
    }
    if len > Envelope::MAX_CONTENT_SIZE {
        return Err(ProtocolError::ContentTooLarge { size: len, max: Envelope::MAX_CONTENT_SIZE });
    }
    // INVARIANT: MAX_CONTENT_SIZE < u32::MAX
    Ok(len as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Envelope {
        Envelope::new(
            BlockHash::from_bytes([0x42; 32]),
            RecipientRef::new(&b"bob"[..]).unwrap(),
            [0x07; Envelope::NONCE_SIZE],
            vec![0xCD; 1024 + Envelope::TAG_SIZE],
        )
    }

    #[test]
    fn envelope_round_trip() {
        let envelope = sample();

        let wire = envelope.to_bytes().unwrap();
        assert_eq!(wire.len(), envelope.encoded_len());

        let parsed = Envelope::decode(&wire).unwrap();
        assert_eq!(parsed, envelope);
    }

    #[test]
    fn empty_recipient_round_trip() {
        let envelope = Envelope { recipient_ref: RecipientRef::empty(), ..sample() };

        let parsed = Envelope::decode(&envelope.to_bytes().unwrap()).unwrap();
        assert!(parsed.recipient_ref.is_empty());
        assert_eq!(parsed, envelope);
    }

    #[test]
    fn reject_truncated_envelope() {
        let wire = sample().to_bytes().unwrap();

        let result = Envelope::decode(&wire[..wire.len() - 1]);
        assert!(matches!(result, Err(ProtocolError::Truncated { .. })));

        // Header only
        let result = Envelope::decode(&wire[..Envelope::HEADER_SIZE]);
        assert!(matches!(result, Err(ProtocolError::Truncated { actual: 0, .. })));
    }

    #[test]
    fn reject_trailing_bytes() {
        let mut wire = sample().to_bytes().unwrap().to_vec();
        wire.extend_from_slice(&[0, 0, 0]);

        assert_eq!(Envelope::decode(&wire), Err(ProtocolError::TrailingBytes(3)));
    }

    #[test]
    fn reject_missing_header() {
        assert!(matches!(Envelope::decode(&[]), Err(ProtocolError::EnvelopeTooShort { .. })));
    }

    #[test]
    fn reject_content_without_tag() {
        let envelope = Envelope { content: Bytes::from_static(&[0u8; 15]), ..sample() };
        assert!(matches!(envelope.to_bytes(), Err(ProtocolError::ContentTooShort { .. })));

        // Hand-built header declaring an empty body
        let header = EnvelopeHeader::new([0; 32], [0; 24], 0, 0);
        assert!(matches!(
            Envelope::decode(&header.to_bytes()),
            Err(ProtocolError::ContentTooShort { size: 0, .. })
        ));
    }

    #[test]
    fn reject_oversize_content_length() {
        let header = EnvelopeHeader::new([0; 32], [0; 24], 0, u32::MAX);

        // Rejected from the header alone, before looking at the body
        assert!(matches!(
            Envelope::decode(&header.to_bytes()),
            Err(ProtocolError::ContentTooLarge { .. })
        ));
    }

    #[test]
    fn associated_data_covers_routing_fields() {
        let envelope = sample();
        let aad = Envelope::associated_data(&envelope.header_ref, &envelope.recipient_ref);

        assert_eq!(aad.len(), BlockHash::SIZE + 3);
        assert_eq!(&aad[..BlockHash::SIZE], envelope.header_ref.as_bytes());
        assert_eq!(&aad[BlockHash::SIZE..], b"bob");

        let other = RecipientRef::new(&b"eve"[..]).unwrap();
        assert_ne!(aad, Envelope::associated_data(&envelope.header_ref, &other));
    }

    #[test]
    fn max_content_round_trip() {
        let envelope = Envelope {
            content: Bytes::from(vec![0x5A; Envelope::MAX_CONTENT_SIZE]),
            ..sample()
        };

        let parsed = Envelope::decode(&envelope.to_bytes().unwrap()).unwrap();
        assert_eq!(parsed.content.len(), Envelope::MAX_CONTENT_SIZE);
    }
}
