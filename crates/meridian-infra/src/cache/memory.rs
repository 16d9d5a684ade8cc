//! In-memory content cache with tag-based invalidation.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use meridian_core::domain::Document;
use meridian_core::ports::ContentCache;

struct CacheEntry {
    document: Document,
    tags: Vec<String>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map(|exp| now > exp).unwrap_or(false)
    }
}

/// In-memory cache using a simple HashMap with async RwLock.
///
/// Note: Data is lost on process restart.
pub struct InMemoryContentCache {
    store: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryContentCache {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}

impl Default for InMemoryContentCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentCache for InMemoryContentCache {
    async fn get(&self, key: &str) -> Option<Document> {
        let store = self.store.read().await;
        let entry = store.get(key)?;

        if entry.is_expired(Instant::now()) {
            drop(store);
            let mut store = self.store.write().await;
            // Re-check: another task may have refreshed it in between.
            if store.get(key).is_some_and(|e| e.is_expired(Instant::now())) {
                store.remove(key);
            }
            return None;
        }

        Some(entry.document.clone())
    }

    async fn set(&self, key: &str, document: Document, tags: &[&str], ttl: Option<Duration>) {
        let mut store = self.store.write().await;

        store.insert(
            key.to_string(),
            CacheEntry {
                document,
                tags: tags.iter().map(|t| t.to_string()).collect(),
                expires_at: ttl.map(|d| Instant::now() + d),
            },
        );
    }

    async fn invalidate_tag(&self, tag: &str) -> usize {
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|_, entry| !entry.tags.iter().any(|t| t == tag));
        before - store.len()
    }

    async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|_, entry| !entry.is_expired(now));
        before - store.len()
    }
}
