//! Account registration and login endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use domain::{Credentials, RegisterPayload, User};
use store::BackingStore;

use crate::AppState;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /v1/users/register: create an account.
///
/// Returns the created user; the password hash is never serialized.
#[tracing::instrument(skip(state, payload))]
pub async fn register<S: BackingStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(payload): Json<RegisterPayload>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let ctx = state.shutdown.child_token();
    let user = state.users.register(&ctx, &payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /v1/users/login: exchange credentials for an access token.
#[tracing::instrument(skip(state, credentials))]
pub async fn login<S: BackingStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<TokenResponse>, ApiError> {
    let ctx = state.shutdown.child_token();
    let token = state.users.login(&ctx, &credentials).await?;
    Ok(Json(TokenResponse { token }))
}
