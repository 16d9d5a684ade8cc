//! # Meridian Infrastructure
//!
//! Concrete implementations of the ports defined in `meridian-core`:
//! rate limiting and its snapshot file, content caching and email delivery.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, console mail only
//! - `throttle` - Per-source request spacing via governor
//! - `http-mail` - Email delivery through an HTTP provider API

pub mod cache;
pub mod content;
pub mod mail;
pub mod rate_limit;

// Re-exports
pub use cache::InMemoryContentCache;
pub use content::{CachedContentRepository, InMemoryContentRepository};
pub use mail::ConsoleMailer;
pub use rate_limit::{FixedWindowRateLimiter, JsonFileStore, RateLimitConfig};

#[cfg(feature = "http-mail")]
pub use mail::{HttpMailConfig, HttpMailer};

#[cfg(feature = "throttle")]
pub use rate_limit::IntervalThrottle;
