//! Persistence layer for the book store.
//!
//! The [`ports`] module defines the narrow traits the services are
//! written against; [`postgres`] implements them on a connection pool
//! and [`memory`] implements them on shared vectors for tests.

pub mod error;
pub mod memory;
pub mod ports;
pub mod postgres;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use ports::{BackingStore, BookStore, OrderLineStore, OrderStore, Transactor, UserStore};
pub use postgres::PostgresStore;
