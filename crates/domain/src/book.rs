use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::BookId;
use crate::money::Money;

/// A book in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,

    /// International Standard Book Number, stored as entered.
    pub isbn: String,

    pub title: String,

    /// Current list price. Orders snapshot this value per line at
    /// purchase time, so later price changes do not rewrite history.
    pub price: Money,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
