//! HTTP handlers and route configuration.

mod content;
mod forms;
mod health;
mod locales;
mod revalidate;

use actix_web::{error::JsonPayloadError, web};

use crate::middleware::error::AppError;

/// Request bodies above this size are rejected before parsing.
const MAX_JSON_BODY: usize = 64 * 1024;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .route("/locales", web::get().to(locales::list_locales))
            .route("/content", web::get().to(content::get_content))
            .route("/content/{path:.*}", web::get().to(content::get_content))
            .service(
                web::scope("/forms")
                    .route("/contact", web::post().to(forms::contact))
                    .route("/quote", web::post().to(forms::quote))
                    .route("/careers", web::post().to(forms::careers)),
            )
            .route("/revalidate", web::post().to(revalidate::revalidate)),
    );
}

/// Malformed JSON bodies become problem responses like every other error.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_JSON_BODY)
        .error_handler(|err, _req| {
            let detail = match &err {
                JsonPayloadError::ContentType => "Expected an application/json body".to_string(),
                other => other.to_string(),
            };
            AppError::BadRequest(detail).into()
        })
}
