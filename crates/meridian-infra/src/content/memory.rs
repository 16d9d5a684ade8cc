//! In-memory content repository, seeded from a JSON export of the CMS.

use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;

use meridian_core::domain::Document;
use meridian_core::ports::{ContentError, ContentRepository};

/// Documents held in memory.
///
/// Used when no CMS API is reachable (local development, tests) and as the
/// target of content snapshot files: a JSON array of documents.
pub struct InMemoryContentRepository {
    documents: RwLock<Vec<Document>>,
}

impl InMemoryContentRepository {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents: RwLock::new(documents),
        }
    }

    /// Load documents from a JSON snapshot file.
    pub async fn from_snapshot_file(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let path = path.as_ref();
        let raw = tokio::fs::read(path)
            .await
            .map_err(|e| ContentError::Backend(format!("{}: {e}", path.display())))?;
        let documents: Vec<Document> = serde_json::from_slice(&raw)
            .map_err(|e| ContentError::Backend(format!("{}: {e}", path.display())))?;

        tracing::info!(
            path = %path.display(),
            documents = documents.len(),
            "Content snapshot loaded"
        );
        Ok(Self::new(documents))
    }

    /// Add or replace a document (matched by id).
    pub async fn upsert(&self, document: Document) {
        let mut documents = self.documents.write().await;
        match documents.iter_mut().find(|d| d.id == document.id) {
            Some(existing) => *existing = document,
            None => documents.push(document),
        }
    }
}

impl Default for InMemoryContentRepository {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl ContentRepository for InMemoryContentRepository {
    async fn get_single(&self, doc_type: &str, locale: &str) -> Result<Document, ContentError> {
        self.documents
            .read()
            .await
            .iter()
            .find(|d| d.doc_type == doc_type && d.lang == locale)
            .cloned()
            .ok_or_else(|| ContentError::not_found(doc_type, None, locale))
    }

    async fn get_by_uid(
        &self,
        doc_type: &str,
        uid: &str,
        locale: &str,
    ) -> Result<Document, ContentError> {
        self.documents
            .read()
            .await
            .iter()
            .find(|d| d.doc_type == doc_type && d.lang == locale && d.uid.as_deref() == Some(uid))
            .cloned()
            .ok_or_else(|| ContentError::not_found(doc_type, Some(uid), locale))
    }
}
