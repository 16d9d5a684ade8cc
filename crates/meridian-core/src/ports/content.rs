//! CMS content port.

use async_trait::async_trait;

use crate::domain::Document;

/// Read access to published CMS documents.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Fetch the singleton document of `doc_type` in `locale`.
    async fn get_single(&self, doc_type: &str, locale: &str) -> Result<Document, ContentError>;

    /// Fetch the document of `doc_type` with `uid` in `locale`.
    async fn get_by_uid(
        &self,
        doc_type: &str,
        uid: &str,
        locale: &str,
    ) -> Result<Document, ContentError>;
}

/// Content lookup errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ContentError {
    #[error("Document not found: type {doc_type}, uid {uid:?}, locale {locale}")]
    NotFound {
        doc_type: String,
        uid: Option<String>,
        locale: String,
    },

    #[error("Content backend error: {0}")]
    Backend(String),
}

impl ContentError {
    pub fn not_found(doc_type: &str, uid: Option<&str>, locale: &str) -> Self {
        Self::NotFound {
            doc_type: doc_type.to_string(),
            uid: uid.map(str::to_string),
            locale: locale.to_string(),
        }
    }
}
