//! Header synchronization.
//!
//! Keeps a [`SharedHeaderWindow`] current from a [`HeaderSource`]. This is
//! the only part of the crate that awaits: encode and decode read whatever
//! the window holds at the time of the call.
//!
//! When the reported tip is more than one block ahead, missing parents are
//! fetched by `prev_hash` and observed oldest-first, so a node that slept
//! through a few blocks still ends up with a full lookback window.
//!
//! ```text
//!   window:  ... H-1  H          source tip: H+3
//!   fetch:   H+3 -> H+2 -> H+1   (stop: parent H already known)
//!   observe: H+1, H+2, H+3
//! ```

use std::time::Duration;

use crate::{
    env::Environment,
    header::BlockHeader,
    source::{HeaderSource, SourceError},
    window::{LOOKBACK_DEPTH, ObserveOutcome, SharedHeaderWindow},
};

/// Default interval between polls of the header source.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Default number of missing parents fetched per update.
pub const DEFAULT_MAX_BACKFILL: usize = LOOKBACK_DEPTH;

/// Header synchronization configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Delay between polls in [`HeaderSync::run`]
    pub poll_interval: Duration,
    /// Missing parents fetched per update (also capped by window capacity)
    pub max_backfill: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { poll_interval: DEFAULT_POLL_INTERVAL, max_backfill: DEFAULT_MAX_BACKFILL }
    }
}

/// Effect of one synchronization step on the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Window already had the reported header, or it was stale
    Unchanged,
    /// Window gained new headers
    Advanced {
        /// Headers inserted, including backfilled parents
        observed: usize,
        /// Height of the newest header after the update
        tip_height: u64,
    },
}

/// Drives a [`HeaderSource`] into a [`SharedHeaderWindow`].
#[derive(Debug, Clone)]
pub struct HeaderSync<S, E> {
    source: S,
    window: SharedHeaderWindow,
    env: E,
    config: SyncConfig,
}

impl<S: HeaderSource, E: Environment> HeaderSync<S, E> {
    /// Create a synchronizer writing into `window`.
    pub fn new(source: S, window: SharedHeaderWindow, env: E, config: SyncConfig) -> Self {
        Self { source, window, env, config }
    }

    /// The window being kept current.
    pub fn window(&self) -> &SharedHeaderWindow {
        &self.window
    }

    /// Fetch the source's tip once and bring the window up to it.
    ///
    /// # Errors
    ///
    /// - `SourceError::Unavailable` if the source fails; headers fetched
    ///   before the failure are discarded and the window is unchanged
    /// - `SourceError::NotFound` if the source reports no tip
    pub async fn poll_once(&self) -> Result<SyncOutcome, SourceError> {
        let tip = self.source.latest_header().await?;
        self.ingest(tip).await
    }

    /// Handle a header pushed by the source (new-block notification).
    ///
    /// # Errors
    ///
    /// - `SourceError::Unavailable` if a parent lookup fails
    pub async fn notify(&self, header: BlockHeader) -> Result<SyncOutcome, SourceError> {
        self.ingest(header).await
    }

    /// Poll forever at [`SyncConfig::poll_interval`].
    ///
    /// Source failures are logged and retried on the next tick. Cancel by
    /// dropping the future.
    pub async fn run(&self) {
        loop {
            match self.poll_once().await {
                Ok(SyncOutcome::Advanced { observed, tip_height }) => {
                    tracing::debug!(observed, tip_height, "header window advanced");
                },
                Ok(SyncOutcome::Unchanged) => {},
                Err(e) => {
                    tracing::warn!(error = %e, transient = e.is_transient(), "header poll failed");
                },
            }

            self.env.sleep(self.config.poll_interval).await;
        }
    }

    async fn ingest(&self, tip: BlockHeader) -> Result<SyncOutcome, SourceError> {
        let snapshot = self.window.snapshot();
        if snapshot.contains(tip.hash()) {
            return Ok(SyncOutcome::Unchanged);
        }

        let newest_height = snapshot.current().ok().map(BlockHeader::height);
        let max_backfill = self.config.max_backfill.min(snapshot.capacity().saturating_sub(1));

        // Newest first; reversed before observing
        let mut chain = vec![tip];
        while chain.len() <= max_backfill {
            let Some(last) = chain.last() else { break };
            let parent_hash = *last.prev_hash();

            if last.height() == 0 || snapshot.contains(&parent_hash) {
                break;
            }
            if newest_height.is_some_and(|newest| last.height() - 1 < newest) {
                break;
            }

            match self.source.header_by_hash(&parent_hash).await {
                Ok(parent) => chain.push(parent),
                Err(SourceError::NotFound(hash)) => {
                    tracing::debug!(header = %hash, "backfill parent unknown to source");
                    break;
                },
                Err(e) => return Err(e),
            }
        }

        let observed_at = self.env.wall_clock_secs();
        let mut observed = 0;
        for header in chain.iter().rev() {
            if let ObserveOutcome::Inserted { .. } =
                self.window.observe(header.with_observed_at(observed_at))
            {
                observed += 1;
            }
        }

        if observed == 0 {
            return Ok(SyncOutcome::Unchanged);
        }

        let tip_height = self.window.snapshot().current().map_or(0, BlockHeader::height);
        Ok(SyncOutcome::Advanced { observed, tip_height })
    }
}
