use thiserror::Error;

use domain::{BookId, DomainError};
use store::StoreError;

/// Errors surfaced by the application services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller input failed validation.
    #[error(transparent)]
    Validation(#[from] DomainError),

    /// The requested book does not exist in the catalog.
    #[error("Book not found: {book_id}")]
    BookNotFound { book_id: BookId },

    /// The email address already belongs to an account.
    #[error("Email already registered: {email}")]
    EmailTaken { email: String },

    /// The email/password pair did not match an account.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The access token is missing, malformed, expired, or forged.
    #[error("Invalid or expired access token")]
    InvalidToken,

    /// Signing an access token failed.
    #[error("Token signing error: {0}")]
    Token(#[source] jsonwebtoken::errors::Error),

    /// Hashing a password failed.
    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    /// The surrounding context was cancelled before work started.
    #[error("Operation cancelled before it started")]
    Cancelled,

    /// A store operation failed. `operation` names what was being
    /// attempted so the failure can be traced without a debugger.
    #[error("{operation} failed: {source}")]
    Store {
        operation: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ServiceError {
    /// Wraps a store error with the name of the failing operation.
    pub fn store(operation: &'static str, source: StoreError) -> Self {
        Self::Store { operation, source }
    }
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
