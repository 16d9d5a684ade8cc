//! Rate limiting port.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Rate limiter trait - abstraction over rate limiting backends.
///
/// `check` is infallible and synchronous: backends must answer from memory
/// and push any I/O to the background.
pub trait RateLimiter: Send + Sync {
    /// Count a request against `identifier` and decide whether it is admitted.
    fn check(&self, identifier: &str, policy: RateLimitPolicy) -> RateLimitDecision;

    /// Drop entries whose window has passed. Returns how many were removed.
    fn sweep(&self) -> usize;
}

/// Quota applied by a single call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    max_requests: u32,
    window: Duration,
}

impl RateLimitPolicy {
    /// `max_requests` below 1 is raised to 1.
    pub const fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests: if max_requests == 0 { 1 } else { max_requests },
            window,
        }
    }

    pub const fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub const fn window(&self) -> Duration {
        self.window
    }

    pub fn window_millis(&self) -> i64 {
        i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX)
    }
}

impl Default for RateLimitPolicy {
    /// Five submissions per hour.
    fn default() -> Self {
        Self::new(5, Duration::from_secs(3600))
    }
}

/// Result of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// Milliseconds since the Unix epoch at which the window ends.
    pub reset_time: i64,
}

impl RateLimitDecision {
    /// Time left until the window ends, rounded up to whole seconds.
    pub fn retry_after(&self, now_millis: i64) -> Duration {
        let millis = (self.reset_time - now_millis).max(0) as u64;
        Duration::from_secs(millis.div_ceil(1000))
    }
}

/// Counter for one identifier in the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_time: i64,
}

impl RateLimitEntry {
    pub fn is_expired(&self, now_millis: i64) -> bool {
        now_millis > self.reset_time
    }
}

/// Every tracked identifier and its entry.
pub type RateLimitSnapshot = HashMap<String, RateLimitEntry>;

/// Durable storage for rate limiter state across restarts.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Prepare the backend. An error means persistence is unavailable.
    async fn init(&self) -> Result<(), PersistenceError>;

    /// Load the last saved snapshot. `Ok(None)` if nothing was saved yet.
    async fn load(&self) -> Result<Option<RateLimitSnapshot>, PersistenceError>;

    /// Replace the saved snapshot.
    async fn save(&self, snapshot: &RateLimitSnapshot) -> Result<(), PersistenceError>;
}

/// Persistence errors. Never surfaced past the rate limiter.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt snapshot: {0}")]
    Corrupt(String),
}
