//! Catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use serde::Serialize;

use domain::Book;
use store::BackingStore;

use crate::AppState;
use crate::error::ApiError;
use crate::routes::orders::PageQuery;

#[derive(Serialize)]
pub struct BookListingResponse {
    pub books: Vec<Book>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

/// GET /v1/books: one page of the catalog, ordered by title.
#[tracing::instrument(skip(state))]
pub async fn list<S: BackingStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<BookListingResponse>, ApiError> {
    let ctx = state.shutdown.child_token();
    let page = query.page();
    let listing = state.books.list_books(&ctx, page).await?;

    Ok(Json(BookListingResponse {
        books: listing.books,
        total: listing.total,
        limit: page.limit,
        offset: page.offset,
    }))
}
