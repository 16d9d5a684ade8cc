//! CMS publish webhook.

use actix_web::{HttpResponse, web};
use meridian_core::ports::CMS_CACHE_TAG;
use meridian_shared::dto::{RevalidateRequest, RevalidateResponse};

use crate::middleware::client_ip::ClientIp;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const API_UPDATE: &str = "api-update";
const TEST_TRIGGER: &str = "test-trigger";

/// POST /api/revalidate
///
/// Spacing is enforced per source before the secret is looked at, so
/// guessing the secret is throttled too.
pub async fn revalidate(
    state: web::Data<AppState>,
    client: ClientIp,
    body: web::Json<RevalidateRequest>,
) -> AppResult<HttpResponse> {
    let guard = &state.revalidate;

    if let Err(retry_after) = guard.throttle.check(client.as_str()) {
        tracing::warn!(client = %client.as_str(), "Revalidate webhook throttled");
        return Err(AppError::TooManyRequests { retry_after });
    }

    let req = body.into_inner();
    let authorized = matches!(
        (&guard.secret, &req.secret),
        (Some(expected), Some(given)) if expected == given
    );
    if !authorized {
        tracing::warn!(client = %client.as_str(), "Revalidate webhook with invalid secret");
        return Err(AppError::Unauthorized);
    }

    let (revalidated, purged) = match req.event_type.as_str() {
        API_UPDATE => {
            let purged = state.content_cache.invalidate_tag(CMS_CACHE_TAG).await;
            tracing::info!(purged, "CMS content invalidated");
            (true, purged)
        }
        TEST_TRIGGER => {
            tracing::info!("Revalidate webhook test trigger received");
            (true, 0)
        }
        other => {
            tracing::debug!(event_type = %other, "Ignoring webhook event");
            (false, 0)
        }
    };

    Ok(HttpResponse::Ok().json(RevalidateResponse {
        revalidated,
        purged,
        now: state.clock.now_millis(),
    }))
}
