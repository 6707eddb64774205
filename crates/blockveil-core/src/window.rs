//! Recent block headers used for key lookback.
//!
//! The window is a fixed-capacity arena: a new header overwrites the slot of
//! the oldest one, so the hot decode path never reallocates.
//!
//! ```text
//!   slots:  [ H-1 | H   | H-3 | H-2 ]      capacity 4
//!                         ^ next (oldest, overwritten by H+1)
//!
//!   candidates_for_decode(): H, H-1, H-2, H-3
//! ```

use std::sync::{Arc, PoisonError, RwLock};

use blockveil_proto::BlockHash;

use crate::{error::EngineError, header::BlockHeader};

/// Smallest window: current header plus [`LOOKBACK_DEPTH`] predecessors.
pub const MIN_CAPACITY: usize = LOOKBACK_DEPTH + 1;

/// Number of headers behind the current one a decoder will try.
pub const LOOKBACK_DEPTH: usize = 3;

/// Upper bound on decrypt attempts per envelope.
pub const MAX_CANDIDATES: usize = LOOKBACK_DEPTH + 1;

/// Result of offering a header to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserveOutcome {
    /// Header became the newest entry
    Inserted {
        /// Oldest header displaced to make room, if the window was full
        evicted: Option<BlockHash>,
    },
    /// Header already present; nothing changed
    Duplicate,
    /// Header is lower than the newest entry; ignored to keep insertion
    /// order equal to chain order
    Stale,
}

/// The most recent block headers, newest last in insertion order.
///
/// # Invariants
///
/// - At most `capacity` entries
/// - Entries are never reordered once inserted
/// - A header is evicted only when a later header takes its slot
/// - Heights are non-decreasing in insertion order
///
/// # Competing tips
///
/// Lookback is counted in held headers, not in heights. Each competing tip
/// occupies a candidate slot, so after a fork at height `H` the decode
/// candidates are both tips plus `H-1` and `H-2`, and a sender still sealing
/// against `H-3` is rejected until the window moves on. A window with extra
/// capacity keeps that header for the `header_ref` check only; it is still
/// not tried.
#[derive(Debug, Clone)]
pub struct HeaderWindow {
    /// Fixed-length arena, `len() == capacity`
    slots: Vec<Option<BlockHeader>>,
    /// Slot the next header is written to; the oldest entry once full
    next: usize,
    /// Number of occupied slots
    len: usize,
}

impl HeaderWindow {
    /// Create an empty window.
    ///
    /// Capacities below [`MIN_CAPACITY`] are raised to it.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { slots: vec![None; capacity.max(MIN_CAPACITY)], next: 0, len: 0 }
    }

    /// Maximum number of headers retained.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of headers currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True until the first header is observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a newly reported header.
    ///
    /// Idempotent for a hash already present. A header lower than the
    /// current one is ignored. An equal-height header with a different hash
    /// (competing tip) is accepted as the newest, since senders may have
    /// seen either.
    pub fn observe(&mut self, header: BlockHeader) -> ObserveOutcome {
        if self.contains(header.hash()) {
            return ObserveOutcome::Duplicate;
        }

        if let Ok(newest) = self.current()
            && header.height() < newest.height()
        {
            return ObserveOutcome::Stale;
        }

        let capacity = self.capacity();
        let evicted = self.slots[self.next].replace(header).map(|old| *old.hash());
        self.next = (self.next + 1) % capacity;

        if evicted.is_none() {
            self.len += 1;
        }

        debug_assert!(self.len <= capacity);

        ObserveOutcome::Inserted { evicted }
    }

    /// The newest header, used for encoding.
    ///
    /// # Errors
    ///
    /// - `EngineError::NoHeaderAvailable` if nothing has been observed yet
    pub fn current(&self) -> Result<&BlockHeader, EngineError> {
        self.iter_newest_first().next().ok_or(EngineError::NoHeaderAvailable)
    }

    /// Current header followed by up to [`LOOKBACK_DEPTH`] predecessors,
    /// newest first.
    ///
    /// Freshest first because a sender most likely used the latest block it
    /// saw. Equal-height tips count against the same [`MAX_CANDIDATES`]
    /// budget as predecessors.
    pub fn candidates_for_decode(&self) -> impl Iterator<Item = &BlockHeader> {
        self.iter_newest_first().take(MAX_CANDIDATES)
    }

    /// All held headers, newest first.
    pub fn iter_newest_first(&self) -> impl Iterator<Item = &BlockHeader> {
        let capacity = self.capacity();
        (1..=self.len)
            .filter_map(move |back| self.slots[(self.next + capacity - back) % capacity].as_ref())
    }

    /// Look up a held header by hash.
    #[must_use]
    pub fn get(&self, hash: &BlockHash) -> Option<&BlockHeader> {
        self.slots.iter().flatten().find(|header| header.hash() == hash)
    }

    /// True if a header with this hash is held.
    #[must_use]
    pub fn contains(&self, hash: &BlockHash) -> bool {
        self.get(hash).is_some()
    }
}

impl Default for HeaderWindow {
    fn default() -> Self {
        Self::new(MIN_CAPACITY)
    }
}

/// Header window shared between one writer and many readers.
///
/// Readers take an immutable snapshot (`Arc` clone under a brief read lock)
/// and work on it without holding any lock. `observe` replaces the window
/// copy-on-write: it mutates in place when no snapshot is outstanding and
/// clones otherwise, so a decode in progress never sees the window change
/// under it.
#[derive(Debug, Clone, Default)]
pub struct SharedHeaderWindow {
    inner: Arc<RwLock<Arc<HeaderWindow>>>,
}

impl SharedHeaderWindow {
    /// Create an empty shared window.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::from_window(HeaderWindow::new(capacity))
    }

    /// Share an existing window.
    #[must_use]
    pub fn from_window(window: HeaderWindow) -> Self {
        Self { inner: Arc::new(RwLock::new(Arc::new(window))) }
    }

    /// Immutable view of the window as of now.
    ///
    /// A poisoned lock still holds a consistent window (`observe` cannot
    /// panic midway), so poisoning is ignored.
    #[must_use]
    pub fn snapshot(&self) -> Arc<HeaderWindow> {
        Arc::clone(&self.inner.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Insert a header (single writer).
    pub fn observe(&self, header: BlockHeader) -> ObserveOutcome {
        let hash = *header.hash();
        let height = header.height();

        let outcome = {
            let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            Arc::make_mut(&mut *guard).observe(header)
        };

        match outcome {
            ObserveOutcome::Inserted { evicted } => {
                tracing::debug!(header = %hash, height, ?evicted, "observed block header");
            },
            ObserveOutcome::Duplicate => {
                tracing::trace!(header = %hash, height, "duplicate block header");
            },
            ObserveOutcome::Stale => {
                tracing::debug!(header = %hash, height, "ignored stale block header");
            },
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_at(height: u64) -> BlockHeader {
        let mut hash = [0u8; 32];
        hash[..8].copy_from_slice(&height.to_be_bytes());
        let mut prev = [0u8; 32];
        prev[..8].copy_from_slice(&height.wrapping_sub(1).to_be_bytes());

        BlockHeader::new(
            BlockHash::from_bytes(hash),
            BlockHash::from_bytes(prev),
            height,
            1_700_000_000 + height * 600,
            0,
        )
    }

    fn heights<'a>(headers: impl Iterator<Item = &'a BlockHeader>) -> Vec<u64> {
        headers.map(BlockHeader::height).collect()
    }

    #[test]
    fn empty_window_has_no_current() {
        let window = HeaderWindow::default();

        assert!(window.is_empty());
        assert_eq!(window.current(), Err(EngineError::NoHeaderAvailable));
        assert_eq!(window.candidates_for_decode().count(), 0);
    }

    #[test]
    fn capacity_is_at_least_minimum() {
        assert_eq!(HeaderWindow::new(0).capacity(), MIN_CAPACITY);
        assert_eq!(HeaderWindow::new(2).capacity(), MIN_CAPACITY);
        assert_eq!(HeaderWindow::new(10).capacity(), 10);
    }

    #[test]
    fn current_is_newest() {
        let mut window = HeaderWindow::default();
        for height in 1..=3 {
            window.observe(header_at(height));
        }

        assert_eq!(window.current().unwrap().height(), 3);
    }

    #[test]
    fn candidates_are_newest_first_and_bounded() {
        let mut window = HeaderWindow::new(8);
        for height in 1..=8 {
            window.observe(header_at(height));
        }

        assert_eq!(heights(window.candidates_for_decode()), vec![8, 7, 6, 5]);
        assert_eq!(heights(window.iter_newest_first()), vec![8, 7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn candidates_with_partial_window() {
        let mut window = HeaderWindow::default();
        window.observe(header_at(1));
        window.observe(header_at(2));

        assert_eq!(heights(window.candidates_for_decode()), vec![2, 1]);
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut window = HeaderWindow::default();
        for height in 1..=4 {
            assert_eq!(window.observe(header_at(height)), ObserveOutcome::Inserted { evicted: None });
        }

        let outcome = window.observe(header_at(5));

        assert_eq!(outcome, ObserveOutcome::Inserted { evicted: Some(*header_at(1).hash()) });
        assert_eq!(window.len(), 4);
        assert!(!window.contains(header_at(1).hash()));
        assert_eq!(heights(window.iter_newest_first()), vec![5, 4, 3, 2]);
    }

    #[test]
    fn wraps_around_many_times() {
        let mut window = HeaderWindow::default();
        for height in 1..=103 {
            window.observe(header_at(height));
        }

        assert_eq!(window.len(), 4);
        assert_eq!(heights(window.candidates_for_decode()), vec![103, 102, 101, 100]);
    }

    #[test]
    fn duplicate_is_noop() {
        let mut window = HeaderWindow::default();
        window.observe(header_at(1));
        window.observe(header_at(2));

        assert_eq!(window.observe(header_at(1)), ObserveOutcome::Duplicate);
        assert_eq!(window.observe(header_at(2)), ObserveOutcome::Duplicate);
        assert_eq!(window.len(), 2);
        assert_eq!(window.current().unwrap().height(), 2);
    }

    #[test]
    fn lower_header_is_stale() {
        let mut window = HeaderWindow::default();
        window.observe(header_at(10));

        assert_eq!(window.observe(header_at(9)), ObserveOutcome::Stale);
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn competing_tip_at_same_height_becomes_current() {
        let mut window = HeaderWindow::default();
        window.observe(header_at(10));

        let fork = BlockHeader::new(
            BlockHash::from_bytes([0xFF; 32]),
            *header_at(10).prev_hash(),
            10,
            1_700_006_001,
            0,
        );
        assert!(matches!(window.observe(fork.clone()), ObserveOutcome::Inserted { .. }));

        assert_eq!(window.current().unwrap(), &fork);
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn get_finds_held_headers() {
        let mut window = HeaderWindow::default();
        window.observe(header_at(1));

        assert_eq!(window.get(header_at(1).hash()), Some(&header_at(1)));
        assert_eq!(window.get(header_at(2).hash()), None);
    }

    #[test]
    fn snapshot_is_isolated_from_later_observes() {
        let shared = SharedHeaderWindow::new(MIN_CAPACITY);
        shared.observe(header_at(1));

        let before = shared.snapshot();
        shared.observe(header_at(2));
        let after = shared.snapshot();

        assert_eq!(before.current().unwrap().height(), 1);
        assert_eq!(after.current().unwrap().height(), 2);
    }

    #[test]
    fn shared_window_clones_share_state() {
        let writer = SharedHeaderWindow::new(MIN_CAPACITY);
        let reader = writer.clone();

        writer.observe(header_at(7));

        assert_eq!(reader.snapshot().current().unwrap().height(), 7);
    }

    #[test]
    fn concurrent_readers_see_consistent_windows() {
        let shared = SharedHeaderWindow::new(MIN_CAPACITY);
        shared.observe(header_at(1));

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let reader = shared.clone();
                scope.spawn(move || {
                    for _ in 0..1000 {
                        let snapshot = reader.snapshot();
                        let seen = heights(snapshot.iter_newest_first());
                        assert!(seen.windows(2).all(|pair| pair[0] > pair[1]));
                        assert!(seen.len() <= MIN_CAPACITY);
                    }
                });
            }

            for height in 2..500 {
                shared.observe(header_at(height));
            }
        });

        assert_eq!(shared.snapshot().current().unwrap().height(), 499);
    }
}
