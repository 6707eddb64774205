//! Fuzz target for ProtocolEngine::decode
//!
//! Drives the full decode path (parse, candidate search, unpad) with
//! arbitrary wire bytes against a populated header window, optionally
//! starting from a valid envelope and mutating it.
//!
//! # Invariants
//!
//! - Decode never panics
//! - At most `MAX_CANDIDATES` keys are tried
//! - An unmodified envelope always decodes to the original payload

#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use blockveil_core::{
    BlockHeader, EngineConfig, EngineError, Environment, MAX_CANDIDATES, ProtocolEngine,
};
use blockveil_proto::{BlockHash, RecipientRef};
use libfuzzer_sys::fuzz_target;

#[derive(Clone)]
struct FuzzEnv {
    random_byte: u8,
}

impl Environment for FuzzEnv {
    fn sleep(&self, _duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        async {}
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        buffer.fill(self.random_byte);
    }

    fn wall_clock_secs(&self) -> u64 {
        0
    }
}

#[derive(Debug, Arbitrary)]
enum Input {
    Raw(Vec<u8>),
    Mutated { payload: Vec<u8>, nonce_byte: u8, flips: Vec<(u16, u8)> },
}

fn header(height: u64) -> BlockHeader {
    let hash = |h: u64| {
        let mut bytes = [0x77; 32];
        bytes[..8].copy_from_slice(&h.to_be_bytes());
        BlockHash::from_bytes(bytes)
    };
    BlockHeader::new(hash(height), hash(height - 1), height, height * 600, 0)
}

fuzz_target!(|input: Input| {
    let engine = ProtocolEngine::new(FuzzEnv { random_byte: 0 }, EngineConfig::default());
    for height in 1..=6 {
        engine.observe(header(height));
    }

    let (wire, original) = match input {
        Input::Raw(bytes) => (bytes, None),
        Input::Mutated { payload, nonce_byte, flips } => {
            let sender =
                ProtocolEngine::with_window(FuzzEnv { random_byte: nonce_byte }, engine.window().clone());
            let Ok(wire) = sender.encode_to_wire(&payload, RecipientRef::empty()) else {
                return;
            };

            let mut wire = wire.to_vec();
            for (index, mask) in &flips {
                let index = usize::from(*index) % wire.len();
                wire[index] ^= mask;
            }

            let untouched = flips.iter().all(|(_, mask)| *mask == 0);
            (wire, untouched.then_some(payload))
        },
    };

    match engine.decode(&wire) {
        Ok(decoded) => {
            assert!(decoded.attempts >= 1 && decoded.attempts <= MAX_CANDIDATES);
            if let Some(payload) = original {
                assert_eq!(decoded.plaintext, payload);
            }
        },
        Err(EngineError::DecryptionExhausted { attempts }) => {
            assert!(attempts <= MAX_CANDIDATES);
            assert!(original.is_none(), "unmodified envelope failed to decode");
        },
        Err(_) => assert!(original.is_none(), "unmodified envelope failed to decode"),
    }
});
