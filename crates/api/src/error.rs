//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use service::ServiceError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Missing or invalid credentials.
    Unauthorized,
    /// Error bubbled up from a service.
    Service(ServiceError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Missing or invalid access token".to_string(),
            ),
            ApiError::Service(err) => service_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn service_error_to_response(err: ServiceError) -> (StatusCode, String) {
    match &err {
        ServiceError::Validation(_) | ServiceError::EmailTaken { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
        ServiceError::BookNotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        ServiceError::InvalidCredentials | ServiceError::InvalidToken => {
            (StatusCode::UNAUTHORIZED, err.to_string())
        }
        ServiceError::Cancelled => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
        ServiceError::Store { .. } | ServiceError::Token(_) | ServiceError::PasswordHash(_) => {
            // Log the full chain, return a generic body
            tracing::error!(error = %err, "internal server error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}
