//! Validation policy: acceptance window and check ordering.

use std::time::Duration;

/// Default token lifetime (60 seconds).
pub const DEFAULT_TIME_TO_LIVE: Duration = Duration::from_secs(60);

/// Default tolerance for tokens stamped slightly in the future (60 seconds).
pub const DEFAULT_MAX_CLOCK_SKEW: Duration = Duration::from_secs(60);

/// Order in which the validation steps run.
///
/// Both orders accept and reject exactly the same tokens. They differ in
/// which work is done on unauthenticated input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckOrder {
    /// Version, freshness, signature, then decrypt and unpad.
    ///
    /// Nothing is decrypted until the HMAC has been verified.
    #[default]
    VerifyFirst,

    /// Version, decrypt, freshness, signature, then unpad.
    ///
    /// This is the order of the reference implementation. Decrypting before
    /// the HMAC is checked runs the cipher on attacker-controlled bytes and
    /// is the classic setup for a padding oracle. Only select it when
    /// bug-for-bug compatibility with that implementation is required.
    DecryptFirst,
}

/// Inclusive range of acceptable token timestamps (seconds since epoch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityWindow {
    /// Earliest acceptable timestamp; older tokens are expired
    pub earliest: i64,
    /// Latest acceptable timestamp; newer tokens are not yet valid
    pub latest: i64,
}

impl ValidityWindow {
    /// Window accepting `earliest <= timestamp <= latest`.
    pub fn new(earliest: i64, latest: i64) -> Self {
        Self { earliest, latest }
    }

    /// Window accepting every timestamp.
    pub fn unbounded() -> Self {
        Self { earliest: i64::MIN, latest: i64::MAX }
    }

    /// Whether `timestamp` falls inside the window (both ends inclusive).
    pub fn contains(&self, timestamp: i64) -> bool {
        self.earliest <= timestamp && timestamp <= self.latest
    }
}

/// Immutable configuration for a [`crate::TokenCodec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FernetConfig {
    /// How long after issue a token stays valid
    pub time_to_live: Duration,
    /// How far in the future a token timestamp may be
    pub max_clock_skew: Duration,
    /// Order of the validation steps
    pub check_order: CheckOrder,
}

impl Default for FernetConfig {
    fn default() -> Self {
        Self {
            time_to_live: DEFAULT_TIME_TO_LIVE,
            max_clock_skew: DEFAULT_MAX_CLOCK_SKEW,
            check_order: CheckOrder::default(),
        }
    }
}

impl FernetConfig {
    /// Replace the token lifetime.
    #[must_use]
    pub fn with_time_to_live(mut self, time_to_live: Duration) -> Self {
        self.time_to_live = time_to_live;
        self
    }

    /// Replace the allowed clock skew.
    #[must_use]
    pub fn with_max_clock_skew(mut self, max_clock_skew: Duration) -> Self {
        self.max_clock_skew = max_clock_skew;
        self
    }

    /// Replace the validation order.
    #[must_use]
    pub fn with_check_order(mut self, check_order: CheckOrder) -> Self {
        self.check_order = check_order;
        self
    }

    /// Acceptance window `[now - ttl, now + skew]` as seen at `now`.
    ///
    /// Saturates at the ends of the `i64` range.
    pub fn window_at(&self, now: i64) -> ValidityWindow {
        ValidityWindow {
            earliest: now.saturating_sub(secs(self.time_to_live)),
            latest: now.saturating_add(secs(self.max_clock_skew)),
        }
    }
}

fn secs(duration: Duration) -> i64 {
    i64::try_from(duration.as_secs()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_policy() {
        let config = FernetConfig::default();
        assert_eq!(config.time_to_live, Duration::from_secs(60));
        assert_eq!(config.max_clock_skew, Duration::from_secs(60));
        assert_eq!(config.check_order, CheckOrder::VerifyFirst);
    }

    #[test]
    fn window_spans_ttl_and_skew() {
        let config = FernetConfig::default()
            .with_time_to_live(Duration::from_secs(300))
            .with_max_clock_skew(Duration::from_secs(5));

        let window = config.window_at(1_000);
        assert_eq!(window, ValidityWindow::new(700, 1_005));
    }

    #[test]
    fn window_saturates() {
        let config = FernetConfig::default().with_time_to_live(Duration::MAX);
        let window = config.window_at(i64::MIN + 10);
        assert_eq!(window.earliest, i64::MIN);

        let config = FernetConfig::default().with_max_clock_skew(Duration::from_secs(u64::MAX));
        assert_eq!(config.window_at(i64::MAX - 1).latest, i64::MAX);
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let window = ValidityWindow::new(10, 20);
        assert!(window.contains(10));
        assert!(window.contains(20));
        assert!(!window.contains(9));
        assert!(!window.contains(21));
    }

    #[test]
    fn unbounded_window_accepts_extremes() {
        let window = ValidityWindow::unbounded();
        assert!(window.contains(i64::MIN));
        assert!(window.contains(i64::MAX));
    }
}
