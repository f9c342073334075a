//! Password hashing and access-token signing.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use domain::{User, UserId};

use crate::{Result, ServiceError};

/// Claims carried inside an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated user's id.
    pub sub: UserId,
    pub email: String,
    pub fullname: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
}

/// Signs and verifies HS256 access tokens.
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenSigner {
    /// Creates a signer from a shared secret. Tokens live for 24 hours.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(24),
        }
    }

    /// Issues a signed access token for the given user.
    pub fn issue(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            fullname: user.fullname.clone(),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(ServiceError::Token)
    }

    /// Verifies a token and returns its claims.
    ///
    /// Expired, malformed, and wrongly-signed tokens all collapse into
    /// `ServiceError::InvalidToken`; callers never learn which.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|_| ServiceError::InvalidToken)
    }
}

/// Extracts the token from an Authorization header value.
pub fn strip_bearer(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ")
}

/// Hashes a password with Argon2 and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;
    use argon2::{Argon2, PasswordHasher};

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ServiceError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Checks a password against a stored Argon2 hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            id: UserId::new(),
            email: "reader@example.com".to_string(),
            fullname: "Avid Reader".to_string(),
            crypted_password: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let signer = TokenSigner::new("test-secret-at-least-32-chars-long!!");
        let user = test_user();

        let token = signer.issue(&user).unwrap();
        let claims = signer.verify(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.fullname, user.fullname);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signer = TokenSigner::new("secret-one-that-is-long-enough!!!!!!");
        let other = TokenSigner::new("secret-two-that-is-long-enough!!!!!!");

        let token = signer.issue(&test_user()).unwrap();
        assert!(matches!(
            other.verify(&token),
            Err(ServiceError::InvalidToken)
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let signer = TokenSigner::new("test-secret-at-least-32-chars-long!!");
        assert!(matches!(
            signer.verify("not.a.token"),
            Err(ServiceError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let signer = TokenSigner::new("test-secret-at-least-32-chars-long!!");
        let user = test_user();

        // Forge a token that expired an hour ago, beyond the default leeway
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            email: user.email,
            fullname: user.fullname,
            exp: (now - Duration::hours(1)).timestamp(),
            iat: (now - Duration::hours(25)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test-secret-at-least-32-chars-long!!".as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            signer.verify(&token),
            Err(ServiceError::InvalidToken)
        ));
    }

    #[test]
    fn test_strip_bearer() {
        assert_eq!(strip_bearer("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(strip_bearer("Basic abc"), None);
        assert_eq!(strip_bearer("bearer abc"), None);
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("battery staple", &hash));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
