//! Orders and their lines, plus the payload callers submit to place one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::book::Book;
use crate::error::DomainError;
use crate::ids::{BookId, OrderId, OrderLineId, UserId};
use crate::money::Money;

/// A placed order.
///
/// `total_price` always equals the service fee plus the sum of the
/// line totals once the order has been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,

    /// Flat service fee charged on every order.
    pub fee: Money,

    /// Fee plus the sum of all line totals.
    pub total_price: Money,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Lines belonging to this order. Not stored on the orders row;
    /// attached when the order is assembled for a caller.
    #[serde(default)]
    pub lines: Vec<OrderLine>,
}

/// A single line within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub book_id: BookId,

    pub quantity: u32,

    /// Price of one copy at the moment the order was placed.
    pub unit_price: Money,

    /// `unit_price * quantity`, computed when the order was placed.
    pub line_total: Money,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// The book this line refers to, attached when assembling history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<Book>,
}

/// Data required to insert an order row.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub fee: Money,
    pub total_price: Money,
}

/// Data required to insert an order line row.
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub order_id: OrderId,
    pub book_id: BookId,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
}

/// Order placement request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderPayload {
    pub lines: Vec<OrderLinePayload>,
}

/// One requested line in an order placement payload.
///
/// Quantity is signed so that a negative value survives deserialization
/// and is rejected by [`OrderPayload::validate`] instead of by serde.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLinePayload {
    pub book_id: BookId,
    pub quantity: i32,
}

impl OrderPayload {
    /// Checks every requested line for a strictly positive quantity.
    ///
    /// An empty payload is accepted: the resulting order carries only
    /// the service fee.
    pub fn validate(&self) -> Result<(), DomainError> {
        for line in &self.lines {
            if line.quantity <= 0 {
                return Err(DomainError::InvalidQuantity {
                    quantity: line.quantity,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_quantities_pass() {
        let payload = OrderPayload {
            lines: vec![
                OrderLinePayload {
                    book_id: BookId::new(),
                    quantity: 2,
                },
                OrderLinePayload {
                    book_id: BookId::new(),
                    quantity: 1,
                },
            ],
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let payload = OrderPayload {
            lines: vec![OrderLinePayload {
                book_id: BookId::new(),
                quantity: 0,
            }],
        };
        assert_eq!(
            payload.validate(),
            Err(DomainError::InvalidQuantity { quantity: 0 })
        );
    }

    #[test]
    fn test_negative_quantity_rejected_with_value() {
        let payload = OrderPayload {
            lines: vec![
                OrderLinePayload {
                    book_id: BookId::new(),
                    quantity: 3,
                },
                OrderLinePayload {
                    book_id: BookId::new(),
                    quantity: -2,
                },
            ],
        };
        assert_eq!(
            payload.validate(),
            Err(DomainError::InvalidQuantity { quantity: -2 })
        );
    }

    #[test]
    fn test_empty_payload_accepted() {
        let payload = OrderPayload { lines: vec![] };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_payload_deserializes_negative_quantity() {
        let json = r#"{"lines":[{"book_id":"550e8400-e29b-41d4-a716-446655440000","quantity":-1}]}"#;
        let payload: OrderPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.lines[0].quantity, -1);
        assert!(payload.validate().is_err());
    }
}
