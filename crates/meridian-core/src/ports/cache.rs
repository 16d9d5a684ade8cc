use async_trait::async_trait;
use std::time::Duration;

use crate::domain::Document;

/// Tag attached to every cache entry derived from the CMS.
pub const CMS_CACHE_TAG: &str = "cms";

/// Content cache trait - documents keyed by lookup, invalidated by tag.
#[async_trait]
pub trait ContentCache: Send + Sync {
    /// Get a live entry.
    async fn get(&self, key: &str) -> Option<Document>;

    /// Store an entry with tags and an optional TTL.
    async fn set(&self, key: &str, document: Document, tags: &[&str], ttl: Option<Duration>);

    /// Drop every entry carrying `tag`. Returns how many were dropped.
    async fn invalidate_tag(&self, tag: &str) -> usize;

    /// Drop expired entries. Returns how many were dropped.
    async fn purge_expired(&self) -> usize;
}
