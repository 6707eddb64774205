//! Observed block headers.

use blockveil_crypto::{TransportKey, derive_transport_key};
use blockveil_proto::BlockHash;

/// A block header as reported by the header source.
///
/// Immutable once observed: fields are private and only readable. Re-stamping
/// the observation time produces a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    hash: BlockHash,
    prev_hash: BlockHash,
    height: u64,
    /// Block timestamp from the chain
    timestamp: u64,
    /// Local wall clock (unix seconds) when this node saw the header
    observed_at: u64,
}

impl BlockHeader {
    /// Create a header from source data.
    #[must_use]
    pub fn new(
        hash: BlockHash,
        prev_hash: BlockHash,
        height: u64,
        timestamp: u64,
        observed_at: u64,
    ) -> Self {
        Self { hash, prev_hash, height, timestamp, observed_at }
    }

    /// Hash identifying this block.
    #[must_use]
    pub fn hash(&self) -> &BlockHash {
        &self.hash
    }

    /// Hash of the parent block.
    #[must_use]
    pub fn prev_hash(&self) -> &BlockHash {
        &self.prev_hash
    }

    /// Chain height.
    #[must_use]
    pub fn height(&self) -> u64 {
        self.height
    }

    /// Block timestamp as recorded on chain.
    #[must_use]
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Local observation time (unix seconds).
    #[must_use]
    pub fn observed_at(&self) -> u64 {
        self.observed_at
    }

    /// Copy of this header stamped with a new observation time.
    #[must_use]
    pub fn with_observed_at(&self, observed_at: u64) -> Self {
        Self { observed_at, ..self.clone() }
    }

    /// True if `self` directly extends `parent`.
    #[must_use]
    pub fn extends(&self, parent: &Self) -> bool {
        self.prev_hash == parent.hash && self.height == parent.height.saturating_add(1)
    }

    /// Derive the outer-layer key for this block.
    ///
    /// The key is fresh on every call; callers drop it after one operation.
    #[must_use]
    pub fn transport_key(&self) -> TransportKey {
        derive_transport_key(self.hash.as_bytes(), self.prev_hash.as_bytes(), self.timestamp)
    }
}
