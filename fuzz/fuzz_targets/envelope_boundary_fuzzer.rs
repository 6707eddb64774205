//! Fuzz target for envelope header boundary conditions
//!
//! # Strategy
//!
//! - Version: valid (0x01), zero, max, random
//! - Flags: zero, random
//! - Content length: below tag, at tag, at max, just over max, u32::MAX
//! - Recipient length: zero, small, u16::MAX
//!
//! # Invariants
//!
//! - `content_len > MAX_CONTENT_SIZE` MUST return `ContentTooLarge`
//! - `content_len < MIN_CONTENT_SIZE` MUST return `ContentTooShort`
//! - A non-1 version MUST return `UnsupportedVersion`
//! - All decode errors MUST be structured (never panic)

#![no_main]

use arbitrary::Arbitrary;
use blockveil_proto::{Envelope, ProtocolError};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
struct BoundaryEnvelope {
    version: VersionByte,
    flags: u8,
    recipient_len: RecipientLen,
    content_len: ContentLen,
    header_ref: [u8; 32],
    nonce: [u8; 24],
    body_delta: i8,
}

#[derive(Debug, Clone, Arbitrary)]
enum VersionByte {
    Valid,
    Zero,
    Max,
    Random(u8),
}

#[derive(Debug, Clone, Arbitrary)]
enum RecipientLen {
    Zero,
    Small(u8),
    Max,
}

#[derive(Debug, Clone, Arbitrary)]
enum ContentLen {
    BelowTag(u8),
    AtTag,
    SmallestBucket,
    AtMax,
    JustOverMax,
    MaxU32,
    Random(u32),
}

fuzz_target!(|boundary: BoundaryEnvelope| {
    let version = match boundary.version {
        VersionByte::Valid => 0x01,
        VersionByte::Zero => 0,
        VersionByte::Max => u8::MAX,
        VersionByte::Random(v) => v,
    };

    let recipient_len: u16 = match boundary.recipient_len {
        RecipientLen::Zero => 0,
        RecipientLen::Small(n) => u16::from(n),
        RecipientLen::Max => u16::MAX,
    };

    let content_len: u32 = match boundary.content_len {
        ContentLen::BelowTag(n) => u32::from(n) % Envelope::TAG_SIZE as u32,
        ContentLen::AtTag => Envelope::TAG_SIZE as u32,
        ContentLen::SmallestBucket => 1024 + Envelope::TAG_SIZE as u32,
        ContentLen::AtMax => Envelope::MAX_CONTENT_SIZE as u32,
        ContentLen::JustOverMax => Envelope::MAX_CONTENT_SIZE as u32 + 1,
        ContentLen::MaxU32 => u32::MAX,
        ContentLen::Random(r) => r,
    };

    // Keep allocations bounded; a short body exercises Truncated
    let declared = usize::from(recipient_len) + content_len.min(2 * 1024 * 1024) as usize;
    let body_len = declared.saturating_add_signed(isize::from(boundary.body_delta));

    let mut buffer = vec![0u8; Envelope::HEADER_SIZE + body_len];
    buffer[0] = version;
    buffer[1] = boundary.flags;
    buffer[2..4].copy_from_slice(&recipient_len.to_be_bytes());
    buffer[4..8].copy_from_slice(&content_len.to_be_bytes());
    buffer[8..40].copy_from_slice(&boundary.header_ref);
    buffer[40..64].copy_from_slice(&boundary.nonce);

    match Envelope::decode(&buffer) {
        Ok(envelope) => {
            assert_eq!(version, 0x01);
            assert_eq!(boundary.flags, 0);
            assert!(content_len as usize >= Envelope::MIN_CONTENT_SIZE);
            assert!(content_len as usize <= Envelope::MAX_CONTENT_SIZE);
            assert_eq!(envelope.content.len(), content_len as usize);
            assert_eq!(envelope.recipient_ref.len(), usize::from(recipient_len));
            assert_eq!(envelope.header_ref.as_bytes(), &boundary.header_ref);
            assert_eq!(envelope.nonce, boundary.nonce);
        },
        Err(ProtocolError::UnsupportedVersion(v)) => assert_ne!(v, 0x01),
        Err(ProtocolError::ContentTooLarge { size, max }) => assert!(size > max),
        Err(ProtocolError::ContentTooShort { size, min }) => assert!(size < min),
        Err(_) => {},
    }
});
