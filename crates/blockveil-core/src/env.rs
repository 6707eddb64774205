//! Environment abstraction for deterministic testing.
//!
//! Decouples protocol logic from system resources (wall clock, randomness,
//! sleeping). Production uses [`crate::SystemEnv`]; tests supply fixed or
//! seeded implementations.

use std::time::Duration;

use blockveil_crypto::NONCE_SIZE;

/// Abstract environment providing time, randomness, and async sleeping.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// - `random_bytes()` uses cryptographically secure entropy in production;
///   outer-layer nonces come from here
/// - Methods are infallible except in exceptional circumstances (e.g., OS
///   entropy exhaustion)
pub trait Environment: Clone + Send + Sync + 'static {
    /// Sleeps for the specified duration.
    ///
    /// Only header synchronization awaits this; encode and decode never
    /// suspend.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Fills the provided buffer with random bytes.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Local wall-clock time as seconds since the Unix epoch.
    ///
    /// Used to stamp when a block header was observed.
    fn wall_clock_secs(&self) -> u64;

    /// Generates a fresh outer-layer nonce.
    fn random_nonce(&self) -> [u8; NONCE_SIZE] {
        let mut nonce = [0u8; NONCE_SIZE];
        self.random_bytes(&mut nonce);
        nonce
    }
}
