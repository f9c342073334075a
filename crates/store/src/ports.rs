use async_trait::async_trait;

use domain::{
    Book, BookId, NewOrder, NewOrderLine, NewUser, Order, OrderId, OrderLine, Page, User, UserId,
};

use crate::Result;

/// Opens, commits, and rolls back units of work.
///
/// `Tx` is an opaque handle. Writes that take `&mut Self::Tx` are staged
/// inside the unit of work and become visible to readers only after
/// `commit` returns Ok. Dropping the handle without committing discards
/// every staged write.
#[async_trait]
pub trait Transactor: Send + Sync {
    /// Transaction handle passed back into write operations.
    type Tx: Send;

    /// Opens a new unit of work.
    async fn begin(&self) -> Result<Self::Tx>;

    /// Makes all writes staged in `tx` visible atomically.
    async fn commit(&self, tx: Self::Tx) -> Result<()>;

    /// Discards all writes staged in `tx`.
    async fn rollback(&self, tx: Self::Tx) -> Result<()>;
}

/// Persistence for orders.
#[async_trait]
pub trait OrderStore: Transactor {
    /// Inserts a new order row inside the given unit of work.
    async fn insert_order(&self, tx: &mut Self::Tx, new: NewOrder) -> Result<Order>;

    /// Rewrites the totals of an existing order inside the unit of work.
    async fn update_order_total(&self, tx: &mut Self::Tx, order: &Order) -> Result<()>;

    /// Returns one page of a user's orders, most recent first.
    ///
    /// Orders come back without their lines; callers attach those
    /// separately when they need them.
    async fn orders_by_user(&self, user_id: UserId, page: Page) -> Result<Vec<Order>>;

    /// Counts all of a user's orders, ignoring pagination.
    async fn count_orders_by_user(&self, user_id: UserId) -> Result<u64>;
}

/// Persistence for order lines.
#[async_trait]
pub trait OrderLineStore: Transactor {
    /// Inserts a new order line row inside the given unit of work.
    async fn insert_order_line(&self, tx: &mut Self::Tx, new: NewOrderLine) -> Result<OrderLine>;

    /// Returns all lines of an order, oldest first.
    async fn order_lines_by_order(&self, order_id: OrderId) -> Result<Vec<OrderLine>>;
}

/// Read access to the book catalog.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Fetches a single book.
    ///
    /// Fails with `StoreError::NotFound` when no such book exists.
    async fn book_by_id(&self, book_id: BookId) -> Result<Book>;

    /// Returns one page of the catalog, ordered by title.
    async fn books(&self, page: Page) -> Result<Vec<Book>>;

    /// Counts all books in the catalog.
    async fn count_books(&self) -> Result<u64>;
}

/// Persistence for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user.
    ///
    /// Fails with `StoreError::Duplicate` when the email is taken.
    async fn insert_user(&self, new: NewUser) -> Result<User>;

    /// Fetches a user by email.
    ///
    /// Fails with `StoreError::NotFound` when no such user exists.
    async fn user_by_email(&self, email: &str) -> Result<User>;
}

/// Everything the application needs from a persistence backend.
///
/// Implemented automatically for any type that provides all of the
/// store traits, so the API can thread one store through every service.
pub trait BackingStore:
    OrderStore + OrderLineStore + BookStore + UserStore + Clone + Send + Sync + 'static
{
}

impl<T> BackingStore for T where
    T: OrderStore + OrderLineStore + BookStore + UserStore + Clone + Send + Sync + 'static
{
}
