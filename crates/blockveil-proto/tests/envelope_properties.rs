//! Property-based tests for envelope and padding codecs
//!
//! These tests verify the codecs for ALL valid inputs, not just specific
//! examples, and that arbitrary bytes never panic the parser.

use blockveil_proto::{
    BlockHash, Envelope, MAX_PAYLOAD_SIZE, PaddingBucket, RecipientRef, pad, unpad,
};
use bytes::Bytes;
use proptest::prelude::*;

/// Strategy for generating arbitrary envelopes with valid content bounds
fn arbitrary_envelope() -> impl Strategy<Value = Envelope> {
    (
        any::<[u8; 32]>(),
        prop::collection::vec(any::<u8>(), 0..64),
        any::<[u8; 24]>(),
        prop::collection::vec(any::<u8>(), Envelope::MIN_CONTENT_SIZE..2048),
    )
        .prop_map(|(hash, recipient, nonce, content)| {
            Envelope::new(
                BlockHash::from_bytes(hash),
                RecipientRef::new(recipient).unwrap(),
                nonce,
                Bytes::from(content),
            )
        })
}

proptest! {
    #[test]
    fn prop_envelope_encode_decode_roundtrip(envelope in arbitrary_envelope()) {
        let wire = envelope.to_bytes().expect("encode should succeed");

        // PROPERTY: encoded size is header + recipient + content
        prop_assert_eq!(wire.len(), envelope.encoded_len());

        let decoded = Envelope::decode(&wire).expect("decode should succeed");

        // PROPERTY: round-trip must be identity
        prop_assert_eq!(decoded, envelope);
    }

    #[test]
    fn prop_decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        // PROPERTY: arbitrary input yields Ok or a structured error
        let _ = Envelope::decode(&bytes);
    }

    #[test]
    fn prop_any_truncation_is_rejected(envelope in arbitrary_envelope(), cut in 1usize..64) {
        let wire = envelope.to_bytes().expect("encode should succeed");
        let cut = cut.min(wire.len());

        prop_assert!(Envelope::decode(&wire[..wire.len() - cut]).is_err());
    }

    #[test]
    fn prop_padding_round_trip(payload in prop::collection::vec(any::<u8>(), 0..20_000)) {
        let (bucket, padded) = pad(&payload).expect("payload fits a bucket");

        // PROPERTY: padded size is exactly the bucket size
        prop_assert_eq!(padded.len(), bucket.size());

        // PROPERTY: the bucket is the smallest that fits
        for smaller in PaddingBucket::ALL.into_iter().filter(|b| *b < bucket) {
            prop_assert!(payload.len() > smaller.capacity());
        }

        let recovered = unpad(&padded, bucket).expect("unpad should succeed");
        prop_assert_eq!(recovered, payload.as_slice());
    }

    #[test]
    fn prop_unpad_never_panics(
        bytes in prop::collection::vec(any::<u8>(), 1024..=1024),
    ) {
        // PROPERTY: a bucket-sized buffer of garbage never panics
        let _ = unpad(&bytes, PaddingBucket::Kib1);
    }
}

#[test]
fn every_bucket_boundary_round_trips() {
    for bucket in PaddingBucket::ALL {
        for len in [bucket.capacity() - 1, bucket.capacity()] {
            let payload = vec![0x5Au8; len];

            let (chosen, padded) = pad(&payload).unwrap();
            assert_eq!(chosen, bucket, "{len} bytes should land in {bucket:?}");
            assert_eq!(unpad(&padded, chosen).unwrap(), payload.as_slice());
        }

        // One past capacity spills into the next bucket (or is rejected)
        let over = bucket.capacity() + 1;
        if over > MAX_PAYLOAD_SIZE {
            assert!(pad(&vec![0u8; over]).is_err());
        } else {
            let (chosen, _) = pad(&vec![0u8; over]).unwrap();
            assert!(chosen > bucket);
        }
    }
}
