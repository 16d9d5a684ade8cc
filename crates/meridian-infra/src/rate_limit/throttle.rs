//! Minimum spacing between requests from one source, via governor.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter as GovernorRateLimiter};

/// Admits at most one request per `interval` for each key.
///
/// Keys whose interval has passed carry no state worth keeping and are
/// dropped by [`IntervalThrottle::evict_idle`].
pub struct IntervalThrottle {
    limiter: DefaultKeyedRateLimiter<String>,
    clock: DefaultClock,
    interval: Duration,
}

impl IntervalThrottle {
    pub fn new(interval: Duration) -> Self {
        let quota = Quota::with_period(interval)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MAX))
            .allow_burst(NonZeroU32::MIN);

        Self {
            limiter: GovernorRateLimiter::keyed(quota),
            clock: DefaultClock::default(),
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// `Ok(())` if admitted, otherwise how long until the key may retry.
    pub fn check(&self, key: &str) -> Result<(), Duration> {
        self.limiter
            .check_key(&key.to_string())
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }

    /// Forget keys that would be admitted again anyway.
    pub fn evict_idle(&self) -> usize {
        let before = self.limiter.len();
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        before.saturating_sub(self.limiter.len())
    }

    pub fn tracked_keys(&self) -> usize {
        self.limiter.len()
    }
}
