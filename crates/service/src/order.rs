//! Order placement and history.
//!
//! Placing an order is the one multi-write workflow in the system: the order
//! row, its lines, and the final total must land together or not at all, so
//! every write happens inside a single store transaction.

use std::time::Instant;

use tokio_util::sync::CancellationToken;

use domain::{Money, NewOrder, NewOrderLine, Order, OrderPayload, Page, UserId};
use store::{BookStore, OrderLineStore, OrderStore, StoreError, Transactor};

use crate::{Result, ServiceError};

/// Flat fee charged on every order, in addition to the line totals.
pub const SERVICE_FEE: Money = Money::from_cents(1000);

/// One page of a user's orders plus the total count across all pages.
#[derive(Debug, Clone)]
pub struct OrderHistory {
    pub orders: Vec<Order>,
    /// Total orders the user has placed, independent of the page.
    pub total: u64,
}

/// Places orders and reads order history.
///
/// The order store and the catalog are separate type parameters so tests can
/// swap either side independently; in production both are the same Postgres
/// store.
#[derive(Debug, Clone)]
pub struct OrderService<S, B> {
    store: S,
    catalog: B,
}

impl<S, B> OrderService<S, B>
where
    S: OrderStore + OrderLineStore,
    B: BookStore,
{
    pub fn new(store: S, catalog: B) -> Self {
        Self { store, catalog }
    }

    /// Places an order for the given user.
    ///
    /// Prices are snapshotted from the catalog as each line is written, and
    /// the order total is the service fee plus the sum of the line totals.
    /// Nothing is visible to readers until the transaction commits; any
    /// failure along the way rolls the whole order back.
    #[tracing::instrument(skip(self, ctx, payload), fields(lines = payload.lines.len()))]
    pub async fn create_order(
        &self,
        ctx: &CancellationToken,
        user_id: UserId,
        payload: &OrderPayload,
    ) -> Result<Order> {
        metrics::counter!("order_create_attempts_total").increment(1);
        let start = Instant::now();

        // 1. Reject bad input and cancelled contexts before any work
        if ctx.is_cancelled() {
            return Err(ServiceError::Cancelled);
        }
        payload.validate()?;

        // 2. Open the unit of work
        let mut tx = self
            .store
            .begin()
            .await
            .map_err(|e| ServiceError::store("begin transaction", e))?;

        // 3. Write order, lines, and total; roll back on any failure
        match self.write_order(&mut tx, user_id, payload).await {
            Ok(order) => {
                self.store.commit(tx).await.map_err(|e| {
                    metrics::counter!("orders_failed_total").increment(1);
                    ServiceError::store("commit order", e)
                })?;

                metrics::histogram!("order_creation_duration_seconds")
                    .record(start.elapsed().as_secs_f64());
                metrics::counter!("orders_created_total").increment(1);
                tracing::info!(
                    order_id = %order.id,
                    total_cents = order.total_price.cents(),
                    "order placed"
                );
                Ok(order)
            }
            Err(err) => {
                if let Err(rollback_err) = self.store.rollback(tx).await {
                    tracing::error!(error = %rollback_err, "rollback failed after aborted order");
                }
                metrics::counter!("orders_failed_total").increment(1);
                Err(err)
            }
        }
    }

    async fn write_order(
        &self,
        tx: &mut <S as Transactor>::Tx,
        user_id: UserId,
        payload: &OrderPayload,
    ) -> Result<Order> {
        // Insert the skeleton first, fee-only, so lines have a row to
        // reference; the real total lands in one update at the end.
        let mut order = self
            .store
            .insert_order(
                tx,
                NewOrder {
                    user_id,
                    fee: SERVICE_FEE,
                    total_price: SERVICE_FEE,
                },
            )
            .await
            .map_err(|e| ServiceError::store("insert order", e))?;

        let mut lines_total = Money::zero();
        for requested in &payload.lines {
            // Validation guarantees a positive quantity
            let quantity = requested.quantity as u32;

            let book = self
                .catalog
                .book_by_id(requested.book_id)
                .await
                .map_err(|e| match e {
                    StoreError::NotFound => ServiceError::BookNotFound {
                        book_id: requested.book_id,
                    },
                    other => ServiceError::store("fetch book", other),
                })?;

            let line = self
                .store
                .insert_order_line(
                    tx,
                    NewOrderLine {
                        order_id: order.id,
                        book_id: book.id,
                        quantity,
                        unit_price: book.price,
                        line_total: book.price.multiply(quantity),
                    },
                )
                .await
                .map_err(|e| ServiceError::store("insert order line", e))?;

            lines_total += line.line_total;
            order.lines.push(line);
        }

        order.total_price = order.fee + lines_total;
        self.store
            .update_order_total(tx, &order)
            .await
            .map_err(|e| ServiceError::store("update order total", e))?;

        Ok(order)
    }

    /// Returns one page of the user's orders, most recent first, with lines
    /// and their books attached.
    ///
    /// History must reflect what was sold, so a book that cannot be fetched
    /// (even one since removed from the catalog) is treated as a persistence
    /// failure rather than silently skipped.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn order_history(
        &self,
        ctx: &CancellationToken,
        user_id: UserId,
        page: Page,
    ) -> Result<OrderHistory> {
        if ctx.is_cancelled() {
            return Err(ServiceError::Cancelled);
        }

        let mut orders = self
            .store
            .orders_by_user(user_id, page)
            .await
            .map_err(|e| ServiceError::store("list orders", e))?;
        let total = self
            .store
            .count_orders_by_user(user_id)
            .await
            .map_err(|e| ServiceError::store("count orders", e))?;

        for order in &mut orders {
            let mut lines = self
                .store
                .order_lines_by_order(order.id)
                .await
                .map_err(|e| ServiceError::store("list order lines", e))?;

            for line in &mut lines {
                let book = self
                    .catalog
                    .book_by_id(line.book_id)
                    .await
                    .map_err(|e| ServiceError::store("fetch book", e))?;
                line.book = Some(book);
            }
            order.lines = lines;
        }

        Ok(OrderHistory { orders, total })
    }
}
