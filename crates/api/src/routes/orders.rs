//! Order placement and history endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use domain::{Order, OrderPayload, Page};
use store::BackingStore;

use crate::AppState;
use crate::auth::AuthUser;
use crate::error::ApiError;

/// Raw pagination query values.
///
/// Kept as strings so an unparseable value falls back to the defaults
/// instead of rejecting the request.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl PageQuery {
    pub(crate) fn page(&self) -> Page {
        Page::clamped(
            self.limit.as_deref().and_then(|s| s.parse().ok()),
            self.offset.as_deref().and_then(|s| s.parse().ok()),
        )
    }
}

#[derive(Serialize)]
pub struct OrderHistoryResponse {
    pub orders: Vec<Order>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

/// POST /v1/orders: place an order for the authenticated user.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: BackingStore>(
    State(state): State<Arc<AppState<S>>>,
    user: AuthUser,
    Json(payload): Json<OrderPayload>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let ctx = state.shutdown.child_token();
    let order = state.orders.create_order(&ctx, user.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /v1/orders: the authenticated user's order history, newest first.
#[tracing::instrument(skip(state, query))]
pub async fn history<S: BackingStore>(
    State(state): State<Arc<AppState<S>>>,
    user: AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<OrderHistoryResponse>, ApiError> {
    let ctx = state.shutdown.child_token();
    let page = query.page();
    let history = state.orders.order_history(&ctx, user.id, page).await?;

    Ok(Json(OrderHistoryResponse {
        orders: history.orders,
        total: history.total,
        limit: page.limit,
        offset: page.offset,
    }))
}
