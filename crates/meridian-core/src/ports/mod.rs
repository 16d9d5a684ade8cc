//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod cache;
mod clock;
mod content;
mod mailer;
mod rate_limit;

pub use cache::{CMS_CACHE_TAG, ContentCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use content::{ContentError, ContentRepository};
pub use mailer::{MailError, Mailer, OutboundEmail};
pub use rate_limit::{
    PersistenceError, RateLimitDecision, RateLimitEntry, RateLimitPolicy, RateLimitSnapshot,
    RateLimiter, SnapshotStore,
};
