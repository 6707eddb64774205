//! Fuzz target for Envelope::decode
//!
//! Feeds arbitrary byte sequences to the envelope parser to find:
//! - Parser crashes or panics
//! - Integer overflows in length calculations
//! - Buffer over-reads
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.
//! Anything that decodes must re-encode to the same bytes.

#![no_main]

use blockveil_proto::Envelope;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(envelope) = Envelope::decode(data) {
        assert_eq!(envelope.encoded_len(), data.len());

        let encoded = envelope.to_bytes().expect("decoded envelope must re-encode");
        assert_eq!(&encoded[..], data);
    }
});
