//! Read-through cache in front of a content repository.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use meridian_core::domain::Document;
use meridian_core::ports::{CMS_CACHE_TAG, ContentCache, ContentError, ContentRepository};

/// Caches successful lookups under the `cms` tag. Misses and errors are
/// never cached, so a newly published document shows up on the next request.
pub struct CachedContentRepository {
    inner: Arc<dyn ContentRepository>,
    cache: Arc<dyn ContentCache>,
    ttl: Option<Duration>,
}

impl CachedContentRepository {
    pub fn new(
        inner: Arc<dyn ContentRepository>,
        cache: Arc<dyn ContentCache>,
        ttl: Option<Duration>,
    ) -> Self {
        Self { inner, cache, ttl }
    }

    async fn store(&self, key: &str, document: &Document) {
        self.cache
            .set(key, document.clone(), &[CMS_CACHE_TAG], self.ttl)
            .await;
    }
}

// NUL never appears in type names, uids or locale codes.
fn single_key(doc_type: &str, locale: &str) -> String {
    format!("single\0{doc_type}\0{locale}")
}

fn uid_key(doc_type: &str, uid: &str, locale: &str) -> String {
    format!("uid\0{doc_type}\0{uid}\0{locale}")
}

#[async_trait]
impl ContentRepository for CachedContentRepository {
    async fn get_single(&self, doc_type: &str, locale: &str) -> Result<Document, ContentError> {
        let key = single_key(doc_type, locale);
        if let Some(document) = self.cache.get(&key).await {
            return Ok(document);
        }

        let document = self.inner.get_single(doc_type, locale).await?;
        self.store(&key, &document).await;
        Ok(document)
    }

    async fn get_by_uid(
        &self,
        doc_type: &str,
        uid: &str,
        locale: &str,
    ) -> Result<Document, ContentError> {
        let key = uid_key(doc_type, uid, locale);
        if let Some(document) = self.cache.get(&key).await {
            return Ok(document);
        }

        let document = self.inner.get_by_uid(doc_type, uid, locale).await?;
        self.store(&key, &document).await;
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryContentCache;
    use crate::content::InMemoryContentRepository;

    fn page(title: &str) -> Document {
        Document {
            id: "p1".to_string(),
            doc_type: "page".to_string(),
            uid: Some("about".to_string()),
            lang: "en-us".to_string(),
            data: serde_json::json!({ "title": title }),
        }
    }

    #[tokio::test]
    async fn test_serves_cached_until_invalidated() {
        let source = Arc::new(InMemoryContentRepository::new(vec![page("v1")]));
        let cache = Arc::new(InMemoryContentCache::new());
        let repo = CachedContentRepository::new(source.clone(), cache.clone(), None);

        assert_eq!(repo.get_by_uid("page", "about", "en-us").await.unwrap(), page("v1"));

        source.upsert(page("v2")).await;
        assert_eq!(repo.get_by_uid("page", "about", "en-us").await.unwrap(), page("v1"));

        assert_eq!(cache.invalidate_tag(CMS_CACHE_TAG).await, 1);
        assert_eq!(repo.get_by_uid("page", "about", "en-us").await.unwrap(), page("v2"));
    }

    #[tokio::test]
    async fn test_misses_are_not_cached() {
        let source = Arc::new(InMemoryContentRepository::default());
        let cache = Arc::new(InMemoryContentCache::new());
        let repo = CachedContentRepository::new(source.clone(), cache.clone(), None);

        assert!(repo.get_single("home", "en-us").await.is_err());
        assert_eq!(cache.len().await, 0);

        let mut home = page("Home");
        home.doc_type = "home".to_string();
        source.upsert(home).await;
        assert!(repo.get_single("home", "en-us").await.is_ok());
    }
}
