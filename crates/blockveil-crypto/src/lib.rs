//! Blockveil Cryptographic Primitives
//!
//! Outer-layer building blocks for blockveil. Pure functions with
//! deterministic outputs. Callers provide nonces so tests stay deterministic.
//!
//! # Key Lifecycle
//!
//! Every block header observed on chain yields one transport key. Anyone who
//! follows the chain can derive it, so the outer layer provides
//! unlinkability, not long-term secrecy.
//!
//! ```text
//! Block Header (hash, prev_hash, timestamp)
//!        │
//!        ▼
//! SHA-256 → Transport Key (per block)
//!        │
//!        ▼
//! XChaCha20-Poly1305 → Ciphertext ‖ Tag
//! ```
//!
//! Transport keys are derived for a single encrypt or decrypt attempt and
//! zeroized when dropped.
//!
//! # Security
//!
//! Authenticity:
//! - XChaCha20-Poly1305 AEAD detects tampering and wrong keys alike
//! - Tag comparison is constant-time, so a wrong candidate key is rejected
//!   without leaking where the mismatch occurred
//!
//! Nonces:
//! - 192-bit nonces are supplied by the caller, drawn from a CSPRNG per
//!   message; random collisions under one block key are negligible

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cipher;
mod derivation;
mod error;
mod key;

pub use cipher::{NONCE_SIZE, TAG_SIZE, decrypt, encrypt};
pub use derivation::derive_transport_key;
pub use error::CipherError;
pub use key::{KEY_SIZE, TransportKey};
