//! In-memory store implementation for tests.
//!
//! Mirrors the visibility rules of the Postgres store: writes staged in
//! a [`MemoryTx`] become visible only after a successful commit, and
//! dropping the handle abandons them. Failure switches let tests fail
//! any single operation to exercise rollback paths.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use domain::{
    Book, BookId, Money, NewOrder, NewOrderLine, NewUser, Order, OrderId, OrderLine, OrderLineId,
    Page, User, UserId,
};

use crate::{
    Result, StoreError,
    ports::{BookStore, OrderLineStore, OrderStore, Transactor, UserStore},
};

#[derive(Debug, Default)]
struct FailureSwitches {
    begin: bool,
    commit: bool,
    insert_order: bool,
    insert_order_line: bool,
    update_order_total: bool,
    book_by_id: bool,
}

#[derive(Debug, Default)]
struct CallCounts {
    begin: usize,
    commit: usize,
    rollback: usize,
    book_lookups: usize,
}

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<User>,
    books: HashMap<BookId, Book>,
    orders: Vec<Order>,
    lines: Vec<OrderLine>,
    fail: FailureSwitches,
    calls: CallCounts,
}

/// Staged writes for one in-flight unit of work.
#[derive(Debug, Default)]
pub struct MemoryTx {
    orders: Vec<Order>,
    lines: Vec<OrderLine>,
    total_updates: Vec<(OrderId, Money)>,
}

/// In-memory store for testing.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a book to the catalog.
    pub fn seed_book(&self, isbn: &str, title: &str, price: Money) -> Book {
        let now = Utc::now();
        let book = Book {
            id: BookId::new(),
            isbn: isbn.to_string(),
            title: title.to_string(),
            price,
            created_at: now,
            updated_at: now,
        };
        self.state
            .write()
            .unwrap()
            .books
            .insert(book.id, book.clone());
        book
    }

    /// Changes the list price of an existing book.
    pub fn update_book_price(&self, book_id: BookId, price: Money) {
        if let Some(book) = self.state.write().unwrap().books.get_mut(&book_id) {
            book.price = price;
            book.updated_at = Utc::now();
        }
    }

    /// Removes a book from the catalog.
    pub fn remove_book(&self, book_id: BookId) {
        self.state.write().unwrap().books.remove(&book_id);
    }

    /// Configures `begin` to fail.
    pub fn set_fail_on_begin(&self, fail: bool) {
        self.state.write().unwrap().fail.begin = fail;
    }

    /// Configures `commit` to fail. Staged writes are still discarded.
    pub fn set_fail_on_commit(&self, fail: bool) {
        self.state.write().unwrap().fail.commit = fail;
    }

    /// Configures `insert_order` to fail.
    pub fn set_fail_on_insert_order(&self, fail: bool) {
        self.state.write().unwrap().fail.insert_order = fail;
    }

    /// Configures `insert_order_line` to fail.
    pub fn set_fail_on_insert_order_line(&self, fail: bool) {
        self.state.write().unwrap().fail.insert_order_line = fail;
    }

    /// Configures `update_order_total` to fail.
    pub fn set_fail_on_update_order_total(&self, fail: bool) {
        self.state.write().unwrap().fail.update_order_total = fail;
    }

    /// Configures `book_by_id` to fail with a database error rather
    /// than `NotFound`.
    pub fn set_fail_on_book_by_id(&self, fail: bool) {
        self.state.write().unwrap().fail.book_by_id = fail;
    }

    /// Returns how many units of work were opened.
    pub fn begin_count(&self) -> usize {
        self.state.read().unwrap().calls.begin
    }

    /// Returns how many commits were attempted.
    pub fn commit_count(&self) -> usize {
        self.state.read().unwrap().calls.commit
    }

    /// Returns how many rollbacks were requested.
    pub fn rollback_count(&self) -> usize {
        self.state.read().unwrap().calls.rollback
    }

    /// Returns how many single-book lookups were made.
    pub fn book_lookup_count(&self) -> usize {
        self.state.read().unwrap().calls.book_lookups
    }

    /// Returns the number of committed orders.
    pub fn order_count(&self) -> usize {
        self.state.read().unwrap().orders.len()
    }

    /// Returns the number of committed order lines.
    pub fn order_line_count(&self) -> usize {
        self.state.read().unwrap().lines.len()
    }

    fn injected(label: &'static str) -> StoreError {
        StoreError::Database(sqlx::Error::Io(std::io::Error::other(label)))
    }
}

#[async_trait]
impl Transactor for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<Self::Tx> {
        let mut state = self.state.write().unwrap();
        state.calls.begin += 1;
        if state.fail.begin {
            return Err(Self::injected("begin failed"));
        }
        Ok(MemoryTx::default())
    }

    async fn commit(&self, tx: Self::Tx) -> Result<()> {
        let mut state = self.state.write().unwrap();
        state.calls.commit += 1;
        if state.fail.commit {
            // tx drops here, taking its staged writes with it
            return Err(Self::injected("commit failed"));
        }
        state.orders.extend(tx.orders);
        state.lines.extend(tx.lines);
        for (order_id, total_price) in tx.total_updates {
            if let Some(order) = state.orders.iter_mut().find(|o| o.id == order_id) {
                order.total_price = total_price;
                order.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn rollback(&self, _tx: Self::Tx) -> Result<()> {
        self.state.write().unwrap().calls.rollback += 1;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert_order(&self, tx: &mut Self::Tx, new: NewOrder) -> Result<Order> {
        if self.state.read().unwrap().fail.insert_order {
            return Err(Self::injected("insert order failed"));
        }
        let now = Utc::now();
        let order = Order {
            id: OrderId::new(),
            user_id: new.user_id,
            fee: new.fee,
            total_price: new.total_price,
            created_at: now,
            updated_at: now,
            lines: Vec::new(),
        };
        tx.orders.push(order.clone());
        Ok(order)
    }

    async fn update_order_total(&self, tx: &mut Self::Tx, order: &Order) -> Result<()> {
        if self.state.read().unwrap().fail.update_order_total {
            return Err(Self::injected("update order total failed"));
        }
        // An update inside a unit of work must see rows staged earlier
        // in the same unit of work, like a SQL UPDATE would.
        if let Some(staged) = tx.orders.iter_mut().find(|o| o.id == order.id) {
            staged.total_price = order.total_price;
            staged.updated_at = Utc::now();
        } else {
            tx.total_updates.push((order.id, order.total_price));
        }
        Ok(())
    }

    async fn orders_by_user(&self, user_id: UserId, page: Page) -> Result<Vec<Order>> {
        let state = self.state.read().unwrap();
        Ok(state
            .orders
            .iter()
            .rev()
            .filter(|o| o.user_id == user_id)
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn count_orders_by_user(&self, user_id: UserId) -> Result<u64> {
        let state = self.state.read().unwrap();
        Ok(state.orders.iter().filter(|o| o.user_id == user_id).count() as u64)
    }
}

#[async_trait]
impl OrderLineStore for MemoryStore {
    async fn insert_order_line(&self, tx: &mut Self::Tx, new: NewOrderLine) -> Result<OrderLine> {
        if self.state.read().unwrap().fail.insert_order_line {
            return Err(Self::injected("insert order line failed"));
        }
        let now = Utc::now();
        let line = OrderLine {
            id: OrderLineId::new(),
            order_id: new.order_id,
            book_id: new.book_id,
            quantity: new.quantity,
            unit_price: new.unit_price,
            line_total: new.line_total,
            created_at: now,
            updated_at: now,
            book: None,
        };
        tx.lines.push(line.clone());
        Ok(line)
    }

    async fn order_lines_by_order(&self, order_id: OrderId) -> Result<Vec<OrderLine>> {
        let state = self.state.read().unwrap();
        Ok(state
            .lines
            .iter()
            .filter(|l| l.order_id == order_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn book_by_id(&self, book_id: BookId) -> Result<Book> {
        let mut state = self.state.write().unwrap();
        state.calls.book_lookups += 1;
        if state.fail.book_by_id {
            return Err(Self::injected("book lookup failed"));
        }
        state
            .books
            .get(&book_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn books(&self, page: Page) -> Result<Vec<Book>> {
        let state = self.state.read().unwrap();
        let mut books: Vec<Book> = state.books.values().cloned().collect();
        books.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(books
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect())
    }

    async fn count_books(&self) -> Result<u64> {
        Ok(self.state.read().unwrap().books.len() as u64)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, new: NewUser) -> Result<User> {
        let mut state = self.state.write().unwrap();
        if state.users.iter().any(|u| u.email == new.email) {
            return Err(StoreError::Duplicate {
                constraint: "users_email_key".to_string(),
            });
        }
        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            email: new.email,
            fullname: new.fullname,
            crypted_password: new.crypted_password,
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> Result<User> {
        let state = self.state.read().unwrap();
        state
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_order(user_id: UserId) -> NewOrder {
        NewOrder {
            user_id,
            fee: Money::from_cents(1000),
            total_price: Money::from_cents(1000),
        }
    }

    async fn commit_order(store: &MemoryStore, user_id: UserId) -> Order {
        let mut tx = store.begin().await.unwrap();
        let order = store.insert_order(&mut tx, new_order(user_id)).await.unwrap();
        store.commit(tx).await.unwrap();
        order
    }

    #[tokio::test]
    async fn test_commit_makes_order_visible() {
        let store = MemoryStore::new();
        let user_id = UserId::new();

        let order = commit_order(&store, user_id).await;

        let orders = store.orders_by_user(user_id, Page::default()).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, order.id);
        assert_eq!(store.count_orders_by_user(user_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_dropped_tx_discards_staged_writes() {
        let store = MemoryStore::new();
        let user_id = UserId::new();

        let mut tx = store.begin().await.unwrap();
        store.insert_order(&mut tx, new_order(user_id)).await.unwrap();
        drop(tx);

        assert_eq!(store.order_count(), 0);
        assert_eq!(store.count_orders_by_user(user_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rollback_discards_staged_writes() {
        let store = MemoryStore::new();
        let user_id = UserId::new();

        let mut tx = store.begin().await.unwrap();
        store.insert_order(&mut tx, new_order(user_id)).await.unwrap();
        store.rollback(tx).await.unwrap();

        assert_eq!(store.order_count(), 0);
        assert_eq!(store.rollback_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_commit_discards_staged_writes() {
        let store = MemoryStore::new();
        let user_id = UserId::new();
        store.set_fail_on_commit(true);

        let mut tx = store.begin().await.unwrap();
        store.insert_order(&mut tx, new_order(user_id)).await.unwrap();
        assert!(store.commit(tx).await.is_err());

        assert_eq!(store.order_count(), 0);
    }

    #[tokio::test]
    async fn test_update_order_total_applies_on_commit() {
        let store = MemoryStore::new();
        let user_id = UserId::new();

        let mut tx = store.begin().await.unwrap();
        let mut order = store.insert_order(&mut tx, new_order(user_id)).await.unwrap();
        order.total_price = Money::from_cents(14000);
        store.update_order_total(&mut tx, &order).await.unwrap();
        store.commit(tx).await.unwrap();

        let orders = store.orders_by_user(user_id, Page::default()).await.unwrap();
        assert_eq!(orders[0].total_price, Money::from_cents(14000));
    }

    #[tokio::test]
    async fn test_order_lines_filtered_by_order() {
        let store = MemoryStore::new();
        let book = store.seed_book("978-1", "A", Money::from_cents(500));
        let user_id = UserId::new();

        let mut tx = store.begin().await.unwrap();
        let order_a = store.insert_order(&mut tx, new_order(user_id)).await.unwrap();
        let order_b = store.insert_order(&mut tx, new_order(user_id)).await.unwrap();
        store
            .insert_order_line(
                &mut tx,
                NewOrderLine {
                    order_id: order_a.id,
                    book_id: book.id,
                    quantity: 2,
                    unit_price: book.price,
                    line_total: book.price.multiply(2),
                },
            )
            .await
            .unwrap();
        store.commit(tx).await.unwrap();

        assert_eq!(store.order_lines_by_order(order_a.id).await.unwrap().len(), 1);
        assert!(store.order_lines_by_order(order_b.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_orders_paged_most_recent_first() {
        let store = MemoryStore::new();
        let user_id = UserId::new();

        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(commit_order(&store, user_id).await.id);
        }

        let page = store
            .orders_by_user(user_id, Page::new(2, 0))
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, ids[2]);
        assert_eq!(page[1].id, ids[1]);

        let rest = store
            .orders_by_user(user_id, Page::new(2, 2))
            .await
            .unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].id, ids[0]);
    }

    #[tokio::test]
    async fn test_book_by_id_not_found() {
        let store = MemoryStore::new();
        let result = store.book_by_id(BookId::new()).await;
        assert!(matches!(result, Err(StoreError::NotFound)));
        assert_eq!(store.book_lookup_count(), 1);
    }

    #[tokio::test]
    async fn test_books_sorted_by_title() {
        let store = MemoryStore::new();
        store.seed_book("978-2", "Zebra", Money::from_cents(100));
        store.seed_book("978-1", "Aardvark", Money::from_cents(100));

        let books = store.books(Page::default()).await.unwrap();
        assert_eq!(books[0].title, "Aardvark");
        assert_eq!(books[1].title, "Zebra");
        assert_eq!(store.count_books().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        let new_user = || NewUser {
            email: "reader@example.com".to_string(),
            fullname: "Avid Reader".to_string(),
            crypted_password: "hash".to_string(),
        };

        store.insert_user(new_user()).await.unwrap();
        let result = store.insert_user(new_user()).await;
        assert!(matches!(result, Err(StoreError::Duplicate { .. })));
    }

    #[tokio::test]
    async fn test_user_by_email() {
        let store = MemoryStore::new();
        store
            .insert_user(NewUser {
                email: "reader@example.com".to_string(),
                fullname: "Avid Reader".to_string(),
                crypted_password: "hash".to_string(),
            })
            .await
            .unwrap();

        let user = store.user_by_email("reader@example.com").await.unwrap();
        assert_eq!(user.fullname, "Avid Reader");

        let missing = store.user_by_email("nobody@example.com").await;
        assert!(matches!(missing, Err(StoreError::NotFound)));
    }
}
