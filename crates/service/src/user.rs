//! Account registration and login.

use tokio_util::sync::CancellationToken;

use domain::{Credentials, NewUser, RegisterPayload, User};
use store::{StoreError, UserStore};

use crate::auth::{TokenSigner, hash_password, verify_password};
use crate::{Result, ServiceError};

/// Registers accounts and exchanges credentials for access tokens.
#[derive(Clone)]
pub struct UserService<S> {
    store: S,
    tokens: TokenSigner,
}

impl<S> UserService<S>
where
    S: UserStore,
{
    pub fn new(store: S, tokens: TokenSigner) -> Self {
        Self { store, tokens }
    }

    /// Registers a new account.
    ///
    /// The password is hashed before it reaches the store; the plain text is
    /// never persisted.
    #[tracing::instrument(skip(self, ctx, payload), fields(email = %payload.email))]
    pub async fn register(
        &self,
        ctx: &CancellationToken,
        payload: &RegisterPayload,
    ) -> Result<User> {
        if ctx.is_cancelled() {
            return Err(ServiceError::Cancelled);
        }
        payload.validate()?;

        let crypted_password = hash_password(&payload.password)?;
        let user = self
            .store
            .insert_user(NewUser {
                email: payload.email.clone(),
                fullname: payload.fullname.trim().to_string(),
                crypted_password,
            })
            .await
            .map_err(|e| match e {
                StoreError::Duplicate { .. } => ServiceError::EmailTaken {
                    email: payload.email.clone(),
                },
                other => ServiceError::store("insert user", other),
            })?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Exchanges credentials for a signed access token.
    ///
    /// Unknown emails and wrong passwords both return
    /// `ServiceError::InvalidCredentials` so a caller cannot probe which
    /// addresses have accounts.
    #[tracing::instrument(skip(self, ctx, credentials))]
    pub async fn login(&self, ctx: &CancellationToken, credentials: &Credentials) -> Result<String> {
        if ctx.is_cancelled() {
            return Err(ServiceError::Cancelled);
        }

        let user = self
            .store
            .user_by_email(&credentials.email)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => ServiceError::InvalidCredentials,
                other => ServiceError::store("fetch user", other),
            })?;

        if !verify_password(&credentials.password, &user.crypted_password) {
            return Err(ServiceError::InvalidCredentials);
        }

        self.tokens.issue(&user)
    }
}
