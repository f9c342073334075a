//! Domain error types.

use thiserror::Error;

/// Errors raised when validating caller-supplied input.
///
/// These are detected before any work is started, so a payload that
/// fails validation never reaches the store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// Order line quantity must be strictly positive.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: i32 },

    /// Email address does not look like an email address.
    #[error("Invalid email address: {email}")]
    InvalidEmail { email: String },

    /// Fullname is empty or whitespace.
    #[error("Fullname is required")]
    FullnameRequired,

    /// Password is shorter than the minimum length.
    #[error("Password too short (must be at least {min} characters)")]
    PasswordTooShort { min: usize },
}
