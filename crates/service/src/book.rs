//! Catalog browsing.

use tokio_util::sync::CancellationToken;

use domain::{Book, Page};
use store::BookStore;

use crate::{Result, ServiceError};

/// One page of the catalog plus the total number of books.
#[derive(Debug, Clone)]
pub struct BookListing {
    pub books: Vec<Book>,
    /// Total books in the catalog, independent of the page.
    pub total: u64,
}

/// Read-only catalog service.
#[derive(Debug, Clone)]
pub struct BookService<S> {
    store: S,
}

impl<S> BookService<S>
where
    S: BookStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lists a page of the catalog, ordered by title.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn list_books(&self, ctx: &CancellationToken, page: Page) -> Result<BookListing> {
        if ctx.is_cancelled() {
            return Err(ServiceError::Cancelled);
        }

        let books = self
            .store
            .books(page)
            .await
            .map_err(|e| ServiceError::store("list books", e))?;
        let total = self
            .store
            .count_books()
            .await
            .map_err(|e| ServiceError::store("count books", e))?;

        Ok(BookListing { books, total })
    }
}
