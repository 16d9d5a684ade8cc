//! Localized CMS content lookup.

use actix_web::{HttpRequest, HttpResponse, web};
use meridian_core::domain::{ContentQuery, fetch_localized};
use meridian_shared::ApiResponse;
use meridian_shared::dto::{AlternateLinkDto, ContentResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/content/{path}
///
/// `/api/content/zh-cn/careers/driver` serves the `careers` document
/// `driver` in `zh-cn`; without a locale prefix the default locale is used.
pub async fn get_content(state: web::Data<AppState>, req: HttpRequest) -> AppResult<HttpResponse> {
    let path = req.match_info().get("path").unwrap_or_default();
    let route = state.locales.resolve_path(path);
    let logical_path = route.logical_path();

    let query = ContentQuery::from_segments(&route.remaining_segments)
        .ok_or_else(|| AppError::NotFound(format!("No document is served at {logical_path}")))?;

    let document = fetch_localized(
        state.content.as_ref(),
        &query,
        &route.locale,
        state.locales.default_locale(),
        state.locale_fallback,
    )
    .await?;

    if document.lang != route.locale {
        tracing::debug!(
            path = %logical_path,
            requested = %route.locale,
            served = %document.lang,
            "Served fallback locale"
        );
    }

    let alternates = state
        .locales
        .alternates(&logical_path)
        .into_iter()
        .map(|link| AlternateLinkDto {
            locale: link.locale,
            href: link.href,
        })
        .collect();

    let served_locale = document.lang.clone();
    let document =
        serde_json::to_value(document).map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(ContentResponse {
        locale: route.locale,
        served_locale,
        path: logical_path,
        alternates,
        document,
    })))
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test};
    use meridian_core::domain::Document;
    use serde_json::{Value, json};

    use crate::test_support::TestApp;

    fn page(uid: &str, lang: &str, title: &str) -> Document {
        Document {
            id: format!("{uid}-{lang}"),
            doc_type: "page".to_string(),
            uid: Some(uid.to_string()),
            lang: lang.to_string(),
            data: json!({ "title": title }),
        }
    }

    #[actix_web::test]
    async fn test_serves_requested_locale_with_alternates() {
        let app = TestApp::new();
        app.content.upsert(page("about", "en-us", "About us")).await;
        app.content.upsert(page("about", "zh-cn", "关于我们")).await;
        let service = test::init_service(App::new().configure(|cfg| app.configure(cfg))).await;

        let req = test::TestRequest::get()
            .uri("/api/content/zh-cn/about")
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;

        assert_eq!(body["data"]["locale"], "zh-cn");
        assert_eq!(body["data"]["servedLocale"], "zh-cn");
        assert_eq!(body["data"]["path"], "/about");
        assert_eq!(body["data"]["document"]["data"]["title"], "关于我们");
        assert_eq!(body["data"]["alternates"][0]["href"], "/about");
        assert_eq!(body["data"]["alternates"][1]["href"], "/zh-cn/about");
    }

    #[actix_web::test]
    async fn test_falls_back_to_default_locale() {
        let app = TestApp::new();
        app.content.upsert(page("about", "en-us", "About us")).await;
        let service = test::init_service(App::new().configure(|cfg| app.configure(cfg))).await;

        let req = test::TestRequest::get()
            .uri("/api/content/zh-cn/about")
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;

        assert_eq!(body["data"]["locale"], "zh-cn");
        assert_eq!(body["data"]["servedLocale"], "en-us");
        assert_eq!(body["data"]["document"]["data"]["title"], "About us");
    }

    #[actix_web::test]
    async fn test_missing_document_is_not_found() {
        let app = TestApp::new();
        let service = test::init_service(App::new().configure(|cfg| app.configure(cfg))).await;

        for uri in ["/api/content/missing", "/api/content/a/b/c"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&service, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[actix_web::test]
    async fn test_root_serves_home_singleton() {
        let app = TestApp::new();
        app.content
            .upsert(Document {
                id: "home-en".to_string(),
                doc_type: "home".to_string(),
                uid: None,
                lang: "en-us".to_string(),
                data: json!({ "headline": "Freight, delivered" }),
            })
            .await;
        let service = test::init_service(App::new().configure(|cfg| app.configure(cfg))).await;

        let req = test::TestRequest::get().uri("/api/content").to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;

        assert_eq!(body["data"]["path"], "/");
        assert_eq!(body["data"]["document"]["type"], "home");
        assert_eq!(body["data"]["alternates"][1]["href"], "/zh-cn");
    }
}
