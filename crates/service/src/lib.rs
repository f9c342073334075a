//! Application services for the book store.
//!
//! Each service owns one slice of behavior:
//! - [`OrderService`] places orders and assembles order history
//! - [`UserService`] registers accounts and exchanges credentials for tokens
//! - [`BookService`] lists the catalog
//!
//! Services are generic over the store traits so the same code runs
//! against Postgres in production and the in-memory store in tests.

pub mod auth;
pub mod book;
pub mod error;
pub mod order;
pub mod user;

pub use auth::{Claims, TokenSigner, strip_bearer};
pub use book::{BookListing, BookService};
pub use error::{Result, ServiceError};
pub use order::{OrderHistory, OrderService, SERVICE_FEE};
pub use user::UserService;
