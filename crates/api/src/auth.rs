//! Request authentication via bearer tokens.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use domain::UserId;
use service::strip_bearer;
use store::BackingStore;

use crate::AppState;
use crate::error::ApiError;

/// The authenticated caller, extracted from the `Authorization` header.
///
/// Handlers that take an `AuthUser` parameter reject requests without a
/// valid bearer token before any of their own work runs.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
}

impl<S: BackingStore> FromRequestParts<Arc<AppState<S>>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        // Reuse the result when several extractors run on one request
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;
        let token = strip_bearer(header).ok_or(ApiError::Unauthorized)?;
        let claims = state
            .tokens
            .verify(token)
            .map_err(|_| ApiError::Unauthorized)?;

        let user = AuthUser {
            id: claims.sub,
            email: claims.email,
        };
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
