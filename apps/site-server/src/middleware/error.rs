//! Error handling - RFC 7807 compliant responses.

use std::fmt;
use std::time::Duration;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use meridian_core::DomainError;
use meridian_core::ports::{ContentError, MailError};
use meridian_shared::ErrorResponse;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Unauthorized,
    Validation(Vec<String>),
    TooManyRequests { retry_after: Duration },
    BadGateway(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::Validation(errors) => write!(f, "Validation errors: {:?}", errors),
            AppError::TooManyRequests { retry_after } => {
                write!(f, "Too many requests, retry after {}s", retry_after.as_secs())
            }
            AppError::BadGateway(msg) => write!(f, "Upstream failure: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());

        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Unauthorized => ErrorResponse::unauthorized(),
            AppError::Validation(errors) => ErrorResponse::validation_failed(errors.clone()),
            AppError::TooManyRequests { retry_after } => {
                builder
                    .insert_header(("X-RateLimit-Remaining", "0"))
                    .insert_header(("Retry-After", retry_after.as_secs().max(1).to_string()));
                ErrorResponse::too_many_requests()
            }
            AppError::BadGateway(detail) => {
                tracing::error!("Upstream failure: {}", detail);
                ErrorResponse::bad_gateway()
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        builder.json(error)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(errors) => AppError::Validation(errors),
            DomainError::InvalidLocaleConfig(msg) | DomainError::Internal(msg) => {
                AppError::Internal(msg)
            }
        }
    }
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::NotFound { .. } => AppError::NotFound(err.to_string()),
            ContentError::Backend(msg) => AppError::BadGateway(msg),
        }
    }
}

impl From<MailError> for AppError {
    fn from(err: MailError) -> Self {
        AppError::BadGateway(err.to_string())
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_many_requests_sets_headers() {
        let err = AppError::TooManyRequests {
            retry_after: Duration::from_secs(42),
        };
        let res = err.error_response();

        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(res.headers().get("Retry-After").unwrap(), "42");
        assert_eq!(res.headers().get("X-RateLimit-Remaining").unwrap(), "0");
    }

    #[test]
    fn test_content_backend_failure_is_bad_gateway() {
        let err: AppError = ContentError::Backend("timeout".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);

        let err: AppError = ContentError::not_found("page", Some("about"), "zh-cn").into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
