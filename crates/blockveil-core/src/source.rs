//! Block header sources.
//!
//! The engine never talks to the chain itself. A [`HeaderSource`] reports
//! headers, and [`crate::HeaderSync`] feeds them into the window.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use blockveil_proto::BlockHash;
use thiserror::Error;

use crate::header::BlockHeader;

/// Errors reported by a header source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The source has no header with this hash
    #[error("header not found: {0}")]
    NotFound(BlockHash),

    /// The source could not be reached
    #[error("header source unavailable: {0}")]
    Unavailable(String),
}

impl SourceError {
    /// Returns true if retrying later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Provider of block headers (light client, RPC node, relay).
#[async_trait]
pub trait HeaderSource: Send + Sync {
    /// Header at the current chain tip.
    ///
    /// # Errors
    ///
    /// - `SourceError::Unavailable` if the source cannot answer
    /// - `SourceError::NotFound` if the source knows no headers yet
    async fn latest_header(&self) -> Result<BlockHeader, SourceError>;

    /// Header with the given hash.
    ///
    /// # Errors
    ///
    /// - `SourceError::NotFound` if no such header is known
    /// - `SourceError::Unavailable` if the source cannot answer
    async fn header_by_hash(&self, hash: &BlockHash) -> Result<BlockHeader, SourceError>;
}

#[async_trait]
impl<S: HeaderSource + ?Sized> HeaderSource for Arc<S> {
    async fn latest_header(&self) -> Result<BlockHeader, SourceError> {
        (**self).latest_header().await
    }

    async fn header_by_hash(&self, hash: &BlockHash) -> Result<BlockHeader, SourceError> {
        (**self).header_by_hash(hash).await
    }
}

/// In-memory header source for tests and simulation.
///
/// Clones share state, so a test can keep a handle and extend the chain while
/// a [`crate::HeaderSync`] reads from another.
#[derive(Debug, Clone, Default)]
pub struct MemoryHeaderSource {
    inner: Arc<Mutex<MemorySourceInner>>,
}

#[derive(Debug, Default)]
struct MemorySourceInner {
    headers: HashMap<BlockHash, BlockHeader>,
    tip: Option<BlockHash>,
    offline: bool,
}

impl MemoryHeaderSource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header and make it the tip.
    pub fn push(&self, header: BlockHeader) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.tip = Some(*header.hash());
        inner.headers.insert(*header.hash(), header);
    }

    /// Add a header without moving the tip.
    pub fn insert(&self, header: BlockHeader) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.headers.insert(*header.hash(), header);
    }

    /// Point the tip at an already known header. Returns false if unknown.
    pub fn set_tip(&self, hash: &BlockHash) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.headers.contains_key(hash) {
            inner.tip = Some(*hash);
            true
        } else {
            false
        }
    }

    /// Simulate an outage: every query fails with `Unavailable` while set.
    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).offline = offline;
    }

    /// Number of headers known to the source.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).headers.len()
    }

    /// True if the source knows no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl HeaderSource for MemoryHeaderSource {
    async fn latest_header(&self) -> Result<BlockHeader, SourceError> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.offline {
            return Err(SourceError::Unavailable("source offline".to_string()));
        }

        let tip = inner.tip.ok_or_else(|| SourceError::Unavailable("no headers".to_string()))?;
        inner.headers.get(&tip).cloned().ok_or(SourceError::NotFound(tip))
    }

    async fn header_by_hash(&self, hash: &BlockHash) -> Result<BlockHeader, SourceError> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.offline {
            return Err(SourceError::Unavailable("source offline".to_string()));
        }

        inner.headers.get(hash).cloned().ok_or(SourceError::NotFound(*hash))
    }
}
