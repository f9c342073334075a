//! HTTP API server for the bookstore.
//!
//! Provides REST endpoints for accounts, the catalog, and order placement,
//! with structured logging (tracing) and Prometheus metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use service::{BookService, OrderService, TokenSigner, UserService};
use store::BackingStore;

/// Shared application state accessible from all handlers.
pub struct AppState<S: BackingStore> {
    pub orders: OrderService<S, S>,
    pub books: BookService<S>,
    pub users: UserService<S>,
    pub tokens: TokenSigner,
    /// Cancelled when the server starts shutting down. Handlers derive a
    /// child token from it per request, so in-flight work stops accepting
    /// new operations once shutdown begins.
    pub shutdown: CancellationToken,
}

/// Wires the services around a single backing store.
pub fn create_state<S: BackingStore>(
    store: S,
    jwt_secret: &str,
    shutdown: CancellationToken,
) -> Arc<AppState<S>> {
    let tokens = TokenSigner::new(jwt_secret);
    Arc::new(AppState {
        orders: OrderService::new(store.clone(), store.clone()),
        books: BookService::new(store.clone()),
        users: UserService::new(store, tokens.clone()),
        tokens,
        shutdown,
    })
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: BackingStore>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<S>))
        .route("/v1/users/register", post(routes::users::register::<S>))
        .route("/v1/users/login", post(routes::users::login::<S>))
        .route("/v1/books", get(routes::books::list::<S>))
        .route("/v1/orders", post(routes::orders::create::<S>))
        .route("/v1/orders", get(routes::orders::history::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
