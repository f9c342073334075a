//! Domain layer for the book store.
//!
//! This crate provides the shared vocabulary of the system:
//! - UUID-backed identifier newtypes
//! - Money represented in cents
//! - The Book, User, Order, and OrderLine entities
//! - Caller-facing payloads together with their validation rules
//! - Pagination with the boundary's clamping rules

pub mod book;
pub mod error;
pub mod ids;
pub mod money;
pub mod order;
pub mod page;
pub mod user;

pub use book::Book;
pub use error::DomainError;
pub use ids::{BookId, OrderId, OrderLineId, UserId};
pub use money::Money;
pub use order::{NewOrder, NewOrderLine, Order, OrderLine, OrderLinePayload, OrderPayload};
pub use page::Page;
pub use user::{Credentials, MIN_PASSWORD_LEN, NewUser, RegisterPayload, User};
