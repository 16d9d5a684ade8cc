//! CMS documents and locale-aware lookup.

use serde::{Deserialize, Serialize};

use crate::ports::{ContentError, ContentRepository};

/// Singleton document type served at the site root.
pub const HOME_DOCUMENT: &str = "home";
/// Repeatable document type used for single-segment paths.
pub const PAGE_DOCUMENT: &str = "page";

/// A CMS document. `data` is opaque to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    pub lang: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Which document a logical path refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentQuery {
    Single { doc_type: String },
    ByUid { doc_type: String, uid: String },
}

impl ContentQuery {
    /// Map the segments behind the locale prefix to a document.
    ///
    /// `[]` is the home singleton, `[uid]` a page, `[type, uid]` a typed
    /// document. Deeper paths do not name a document.
    pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> Option<Self> {
        match segments {
            [] => Some(ContentQuery::Single {
                doc_type: HOME_DOCUMENT.to_string(),
            }),
            [uid] => Some(ContentQuery::ByUid {
                doc_type: PAGE_DOCUMENT.to_string(),
                uid: uid.as_ref().to_string(),
            }),
            [doc_type, uid] => Some(ContentQuery::ByUid {
                doc_type: doc_type.as_ref().to_string(),
                uid: uid.as_ref().to_string(),
            }),
            _ => None,
        }
    }

    pub async fn fetch(
        &self,
        repo: &dyn ContentRepository,
        locale: &str,
    ) -> Result<Document, ContentError> {
        match self {
            ContentQuery::Single { doc_type } => repo.get_single(doc_type, locale).await,
            ContentQuery::ByUid { doc_type, uid } => repo.get_by_uid(doc_type, uid, locale).await,
        }
    }
}

/// What to do when a document is missing in the requested locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocaleFallback {
    /// Serve the default-locale document instead.
    #[default]
    DefaultLocale,
    /// Report the document as missing.
    None,
}

/// Fetch `query` in `locale`, applying `fallback` on a not-found.
///
/// Backend errors are never masked by the fallback.
pub async fn fetch_localized(
    repo: &dyn ContentRepository,
    query: &ContentQuery,
    locale: &str,
    default_locale: &str,
    fallback: LocaleFallback,
) -> Result<Document, ContentError> {
    match query.fetch(repo, locale).await {
        Err(ContentError::NotFound { .. })
            if fallback == LocaleFallback::DefaultLocale && locale != default_locale =>
        {
            query.fetch(repo, default_locale).await
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct OneDocument;

    #[async_trait]
    impl ContentRepository for OneDocument {
        async fn get_single(&self, doc_type: &str, locale: &str) -> Result<Document, ContentError> {
            Err(ContentError::not_found(doc_type, None, locale))
        }

        async fn get_by_uid(
            &self,
            doc_type: &str,
            uid: &str,
            locale: &str,
        ) -> Result<Document, ContentError> {
            match (doc_type, uid, locale) {
                ("page", "about", "en-us") => Ok(Document {
                    id: "doc-1".to_string(),
                    doc_type: "page".to_string(),
                    uid: Some("about".to_string()),
                    lang: "en-us".to_string(),
                    data: serde_json::json!({"title": "About us"}),
                }),
                ("page", "broken", _) => Err(ContentError::Backend("timeout".to_string())),
                _ => Err(ContentError::not_found(doc_type, Some(uid), locale)),
            }
        }
    }

    #[test]
    fn test_query_from_segments() {
        let empty: [&str; 0] = [];
        assert_eq!(
            ContentQuery::from_segments(&empty),
            Some(ContentQuery::Single {
                doc_type: "home".to_string()
            })
        );
        assert_eq!(
            ContentQuery::from_segments(&["careers", "driver"]),
            Some(ContentQuery::ByUid {
                doc_type: "careers".to_string(),
                uid: "driver".to_string()
            })
        );
        assert_eq!(ContentQuery::from_segments(&["a", "b", "c"]), None);
    }

    #[tokio::test]
    async fn test_falls_back_to_default_locale() {
        let query = ContentQuery::from_segments(&["about"]).unwrap();
        let doc = fetch_localized(
            &OneDocument,
            &query,
            "zh-cn",
            "en-us",
            LocaleFallback::DefaultLocale,
        )
        .await
        .unwrap();
        assert_eq!(doc.lang, "en-us");
    }

    #[tokio::test]
    async fn test_no_fallback_reports_missing() {
        let query = ContentQuery::from_segments(&["about"]).unwrap();
        let err = fetch_localized(&OneDocument, &query, "zh-cn", "en-us", LocaleFallback::None)
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_backend_errors_are_not_masked() {
        let query = ContentQuery::from_segments(&["broken"]).unwrap();
        let err = fetch_localized(
            &OneDocument,
            &query,
            "zh-cn",
            "en-us",
            LocaleFallback::DefaultLocale,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ContentError::Backend(_)));
    }
}
