//! Production Environment implementation using system time and RNG.
//!
//! # Capabilities
//!
//! - Real wall clock (`SystemTime`) for header observation stamps
//! - OS cryptographic RNG (getrandom) for nonces. Truly random, not
//!   reproducible
//! - Tokio async sleep between header polls

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::env::Environment;

/// Production environment using system time and cryptographic RNG.
///
/// # Panics
///
/// Panics if the OS RNG fails. Without working randomness every nonce would
/// be predictable and could repeat under the same block key, so continuing is
/// worse than stopping.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer)
            .expect("invariant: OS RNG failure is unrecoverable - nonces cannot be generated");
    }

    fn wall_clock_secs(&self) -> u64 {
        // A clock before 1970 only affects the observation stamp
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_secs())
    }
}
