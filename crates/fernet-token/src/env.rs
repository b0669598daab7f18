//! Environment abstraction for deterministic testing.
//!
//! Token generation needs randomness (keys, IVs) and wall-clock time
//! (timestamps). Both are injected so that generation and validation are
//! fully deterministic under test, and production uses real system
//! resources through [`SystemEnv`].

/// Source of random bytes for keys and initialization vectors.
///
/// # Safety
///
/// Implementations MUST use cryptographically secure entropy in production.
/// The token format relies entirely on this source for IV uniqueness; nothing
/// in this crate tracks or checks it.
pub trait Entropy {
    /// Fills the provided buffer with random bytes.
    fn random_bytes(&self, buffer: &mut [u8]);
}

/// Wall-clock time source.
pub trait Clock {
    /// Current time in seconds since the Unix epoch.
    fn now_secs(&self) -> i64;
}

impl<T: Entropy + ?Sized> Entropy for &T {
    fn random_bytes(&self, buffer: &mut [u8]) {
        (**self).random_bytes(buffer);
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_secs(&self) -> i64 {
        (**self).now_secs()
    }
}

/// Production environment using system time and the OS RNG.
///
/// # Panics
///
/// Panics if the OS RNG fails. Issuing tokens without functioning
/// cryptographic randomness would produce predictable IVs and keys, so
/// continuing is not an option.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Entropy for SystemEnv {
    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer)
            .expect("invariant: OS RNG failure is unrecoverable - cannot issue tokens securely");
    }
}

impl Clock for SystemEnv {
    #[allow(clippy::disallowed_methods)]
    fn now_secs(&self) -> i64 {
        match std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
            Ok(elapsed) => i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX),
            Err(before_epoch) => {
                i64::try_from(before_epoch.duration().as_secs()).map_or(i64::MIN, |secs| -secs)
            },
        }
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_secs(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_env_random_bytes_are_random() {
        let env = SystemEnv::new();

        let mut bytes1 = [0u8; 32];
        let mut bytes2 = [0u8; 32];

        env.random_bytes(&mut bytes1);
        env.random_bytes(&mut bytes2);

        // Extremely unlikely to be equal if random
        assert_ne!(bytes1, bytes2, "Random bytes should differ");
    }

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemEnv::new().now_secs() > 1_577_836_800);
    }

    #[test]
    fn fixed_clock_never_moves() {
        let clock = FixedClock(499_162_800);
        assert_eq!(clock.now_secs(), 499_162_800);
        assert_eq!(clock.now_secs(), 499_162_800);
    }

    #[test]
    fn references_forward_to_inner() {
        let clock = FixedClock(42);
        let by_ref: &dyn Clock = &clock;
        assert_eq!(by_ref.now_secs(), 42);
    }
}
