//! Locale listing for the language switcher.

use actix_web::{HttpResponse, web};
use meridian_shared::ApiResponse;
use meridian_shared::dto::LocaleInfo;

use crate::state::AppState;

/// GET /api/locales
pub async fn list_locales(state: web::Data<AppState>) -> HttpResponse {
    let default_locale = state.locales.default_locale();
    let locales: Vec<LocaleInfo> = state
        .locales
        .locales()
        .iter()
        .map(|locale| LocaleInfo {
            code: locale.code.clone(),
            display_name: locale.display_name.clone(),
            flag: locale.flag.clone(),
            is_default: locale.code == default_locale,
        })
        .collect();

    HttpResponse::Ok().json(ApiResponse::ok(locales))
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test};
    use serde_json::Value;

    use crate::test_support::TestApp;

    #[actix_web::test]
    async fn test_lists_configured_locales_in_order() {
        let app = TestApp::new();
        let service = test::init_service(App::new().configure(|cfg| app.configure(cfg))).await;

        let req = test::TestRequest::get().uri("/api/locales").to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;

        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["code"], "en-us");
        assert_eq!(data[0]["isDefault"], true);
        assert_eq!(data[1]["code"], "zh-cn");
        assert_eq!(data[1]["isDefault"], false);
    }
}
