//! Rate limiting implementations.

mod file;
mod memory;
mod persist;

pub use file::JsonFileStore;
pub use memory::{FixedWindowRateLimiter, RateLimitConfig};

#[cfg(feature = "throttle")]
mod throttle;
#[cfg(feature = "throttle")]
pub use throttle::IntervalThrottle;
