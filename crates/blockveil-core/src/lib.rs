//! Blockveil protocol engine.
//!
//! Wraps inner-layer ciphertext in an outer layer keyed by recent block
//! headers. Both peers follow the same chain, so both derive the same keys
//! without ever exchanging them. Nodes see headers at slightly different
//! times, so a decoder tries the newest header and a few of its predecessors.
//!
//! # Architecture
//!
//! ```text
//!   HeaderSource ──> HeaderSync ──> SharedHeaderWindow
//!                                          │ snapshot
//!                                          ↓
//!   InnerCipher ──> Messenger ──> ProtocolEngine ──> Envelope (wire)
//! ```
//!
//! - [`HeaderWindow`]: bounded lookback of recent headers
//! - [`ProtocolEngine`]: pad, derive, seal, frame (and the reverse)
//! - [`HeaderSync`]: keeps the window current from a [`HeaderSource`]
//! - [`Messenger`]: composes an [`InnerCipher`] with the engine
//! - [`Environment`]: time and randomness, injectable for tests

#![deny(missing_docs)]

pub mod engine;
pub mod env;
pub mod error;
pub mod header;
pub mod inner;
pub mod source;
pub mod sync;
pub mod system_env;
pub mod window;

pub use engine::{
    DEFAULT_WINDOW_CAPACITY, DecodedMessage, EngineConfig, OperationState, ProtocolEngine,
};
pub use env::Environment;
pub use error::EngineError;
pub use header::BlockHeader;
pub use inner::{InnerCipher, Messenger, MessengerError, OpenedMessage};
pub use source::{HeaderSource, MemoryHeaderSource, SourceError};
pub use sync::{DEFAULT_MAX_BACKFILL, DEFAULT_POLL_INTERVAL, HeaderSync, SyncConfig, SyncOutcome};
pub use system_env::SystemEnv;
pub use window::{
    HeaderWindow, LOOKBACK_DEPTH, MAX_CANDIDATES, MIN_CAPACITY, ObserveOutcome, SharedHeaderWindow,
};
