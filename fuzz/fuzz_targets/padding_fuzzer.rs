//! Fuzz target for the padding codec
//!
//! # Invariants
//!
//! - `pad` succeeds for every payload up to `MAX_PAYLOAD_SIZE`
//! - The padded length is always an exact bucket size
//! - `unpad(pad(x)) == x`
//! - `unpad` on arbitrary bytes never panics

#![no_main]

use arbitrary::Arbitrary;
use blockveil_proto::{MAX_PAYLOAD_SIZE, PaddingBucket, pad, unpad};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct PaddingInput {
    payload: Vec<u8>,
    raw: Vec<u8>,
    bucket: u8,
}

fuzz_target!(|input: PaddingInput| {
    if input.payload.len() > MAX_PAYLOAD_SIZE {
        return;
    }

    let (bucket, padded) = pad(&input.payload).expect("payload within MAX_PAYLOAD_SIZE must pad");
    assert_eq!(padded.len(), bucket.size());
    assert_eq!(PaddingBucket::for_payload(input.payload.len()), Some(bucket));

    let recovered = unpad(&padded, bucket).expect("padded buffer must unpad");
    assert_eq!(recovered, input.payload.as_slice());

    let bucket = PaddingBucket::ALL[usize::from(input.bucket) % PaddingBucket::ALL.len()];
    let _ = unpad(&input.raw, bucket);
});
