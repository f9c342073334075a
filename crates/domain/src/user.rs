use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::UserId;

/// Minimum accepted password length for registration.
pub const MIN_PASSWORD_LEN: usize = 5;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is valid")
});

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,

    pub email: String,

    pub fullname: String,

    /// Argon2 hash of the password. Never leaves the server: skipped
    /// when serializing responses.
    #[serde(skip_serializing, default)]
    pub crypted_password: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data required to insert a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub fullname: String,
    pub crypted_password: String,
}

/// Registration request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterPayload {
    pub email: String,
    pub fullname: String,
    pub password: String,
}

impl RegisterPayload {
    /// Checks the payload against the registration rules.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !EMAIL_RE.is_match(&self.email) {
            return Err(DomainError::InvalidEmail {
                email: self.email.clone(),
            });
        }
        if self.fullname.trim().is_empty() {
            return Err(DomainError::FullnameRequired);
        }
        if self.password.len() < MIN_PASSWORD_LEN {
            return Err(DomainError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }
        Ok(())
    }
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}
