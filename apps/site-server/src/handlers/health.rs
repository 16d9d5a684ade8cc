//! Health check endpoint.

use actix_web::{HttpResponse, web};
use chrono::DateTime;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    pub default_locale: String,
}

/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let timestamp = DateTime::from_timestamp_millis(state.clock.now_millis())
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();

    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp,
        default_locale: state.locales.default_locale().to_string(),
    })
}
