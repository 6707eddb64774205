//! Transport key derivation from block linkage data

use sha2::{Digest, Sha256};

use crate::key::TransportKey;

/// Derive the transport key for a block.
///
/// Computes `SHA-256(block_hash ‖ prev_hash ‖ be64(timestamp))`. The digest is
/// used directly as the XChaCha20-Poly1305 key.
///
/// # Security
///
/// - Deterministic: same inputs always produce same output
/// - Every input byte feeds the digest, so any change yields an unrelated key
/// - Public inputs: the key is only as secret as the chain itself
pub fn derive_transport_key(
    block_hash: &[u8; 32],
    prev_hash: &[u8; 32],
    timestamp: u64,
) -> TransportKey {
    let digest = Sha256::new()
        .chain_update(block_hash)
        .chain_update(prev_hash)
        .chain_update(timestamp.to_be_bytes())
        .finalize();

    TransportKey::new(digest.into(), *block_hash)
}
