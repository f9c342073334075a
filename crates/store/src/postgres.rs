use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use uuid::Uuid;

use domain::{
    Book, BookId, Money, NewOrder, NewOrderLine, NewUser, Order, OrderId, OrderLine, OrderLineId,
    Page, User, UserId,
};

use crate::{
    Result, StoreError,
    ports::{BookStore, OrderLineStore, OrderStore, Transactor, UserStore},
};

/// PostgreSQL-backed store implementation.
///
/// Row ids and timestamps are generated client-side so an insert can
/// hand back the full entity without a round trip.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        tracing::info!("Running database migrations");
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            fee: Money::from_cents(row.try_get("fee")?),
            total_price: Money::from_cents(row.try_get("total_price")?),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            lines: Vec::new(),
        })
    }

    fn row_to_order_line(row: PgRow) -> Result<OrderLine> {
        Ok(OrderLine {
            id: OrderLineId::from_uuid(row.try_get::<Uuid, _>("id")?),
            order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
            book_id: BookId::from_uuid(row.try_get::<Uuid, _>("book_id")?),
            quantity: row.try_get::<i32, _>("quantity")? as u32,
            unit_price: Money::from_cents(row.try_get("unit_price")?),
            line_total: Money::from_cents(row.try_get("line_total")?),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            book: None,
        })
    }

    fn row_to_book(row: PgRow) -> Result<Book> {
        Ok(Book {
            id: BookId::from_uuid(row.try_get::<Uuid, _>("id")?),
            isbn: row.try_get("isbn")?,
            title: row.try_get("title")?,
            price: Money::from_cents(row.try_get("price")?),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_user(row: PgRow) -> Result<User> {
        Ok(User {
            id: UserId::from_uuid(row.try_get::<Uuid, _>("id")?),
            email: row.try_get("email")?,
            fullname: row.try_get("fullname")?,
            crypted_password: row.try_get("crypted_password")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl Transactor for PostgresStore {
    type Tx = Transaction<'static, Postgres>;

    async fn begin(&self) -> Result<Self::Tx> {
        Ok(self.pool.begin().await?)
    }

    async fn commit(&self, tx: Self::Tx) -> Result<()> {
        Ok(tx.commit().await?)
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<()> {
        Ok(tx.rollback().await?)
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn insert_order(&self, tx: &mut Self::Tx, new: NewOrder) -> Result<Order> {
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

        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, fee, total_price, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.user_id.as_uuid())
        .bind(order.fee.cents())
        .bind(order.total_price.cents())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut **tx)
        .await?;

        Ok(order)
    }

    async fn update_order_total(&self, tx: &mut Self::Tx, order: &Order) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE orders
            SET total_price = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.total_price.cents())
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn orders_by_user(&self, user_id: UserId, page: Page) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, fee, total_price, created_at, updated_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(page.limit as i64)
        .bind(page.offset as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn count_orders_by_user(&self, user_id: UserId) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }
}

#[async_trait]
impl OrderLineStore for PostgresStore {
    async fn insert_order_line(&self, tx: &mut Self::Tx, new: NewOrderLine) -> Result<OrderLine> {
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

        sqlx::query(
            r#"
            INSERT INTO order_lines (id, order_id, book_id, quantity, unit_price, line_total, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(line.id.as_uuid())
        .bind(line.order_id.as_uuid())
        .bind(line.book_id.as_uuid())
        .bind(line.quantity as i32)
        .bind(line.unit_price.cents())
        .bind(line.line_total.cents())
        .bind(line.created_at)
        .bind(line.updated_at)
        .execute(&mut **tx)
        .await?;

        Ok(line)
    }

    async fn order_lines_by_order(&self, order_id: OrderId) -> Result<Vec<OrderLine>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, book_id, quantity, unit_price, line_total, created_at, updated_at
            FROM order_lines
            WHERE order_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order_line).collect()
    }
}

#[async_trait]
impl BookStore for PostgresStore {
    async fn book_by_id(&self, book_id: BookId) -> Result<Book> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT id, isbn, title, price, created_at, updated_at
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(book_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_book(row),
            None => Err(StoreError::NotFound),
        }
    }

    async fn books(&self, page: Page) -> Result<Vec<Book>> {
        let rows = sqlx::query(
            r#"
            SELECT id, isbn, title, price, created_at, updated_at
            FROM books
            ORDER BY title ASC, id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit as i64)
        .bind(page.offset as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_book).collect()
    }

    async fn count_books(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn insert_user(&self, new: NewUser) -> Result<User> {
        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            email: new.email,
            fullname: new.fullname,
            crypted_password: new.crypted_password,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, email, fullname, crypted_password, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.fullname)
        .bind(&user.crypted_password)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // Unique violation on email means the account already exists
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("users_email_key")
            {
                return StoreError::Duplicate {
                    constraint: "users_email_key".to_string(),
                };
            }
            StoreError::Database(e)
        })?;

        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> Result<User> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT id, email, fullname, crypted_password, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_user(row),
            None => Err(StoreError::NotFound),
        }
    }
}
