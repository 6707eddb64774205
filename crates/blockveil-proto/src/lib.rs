//! Blockveil wire protocol.
//!
//! Pure serialization for the outer layer: the padding codec that hides
//! payload length behind a fixed set of buckets, and the envelope codec that
//! frames the ciphertext for transport. Nothing in this crate performs
//! cryptography; payloads are opaque bytes.
//!
//! # Envelope
//!
//! ```text
//! ┌──────────────────────── 64-byte header ────────────────────────┐
//! │ version │ flags │ recipient_len │ content_len │ header_ref │ nonce │
//! └─────────────────────────────────────────────────────────────────┘
//! │ recipient_ref (recipient_len bytes) │ content (content_len bytes) │
//! ```
//!
//! # Padding
//!
//! ```text
//! ┌──────────┬───────────┬──────────────┐
//! │ len (be32) │ plaintext │ zero filler │  = 1 KiB | 16 KiB | 256 KiB | 1 MiB
//! └──────────┴───────────┴──────────────┘
//! ```

#![deny(missing_docs)]

pub mod envelope;
pub mod errors;
pub mod hash;
mod header;
pub mod padding;
pub mod recipient;

pub use envelope::Envelope;
pub use errors::{PaddingError, ProtocolError, Result};
pub use hash::BlockHash;
pub use padding::{LENGTH_PREFIX_SIZE, MAX_PAYLOAD_SIZE, PaddingBucket, pad, unpad};
pub use recipient::RecipientRef;
