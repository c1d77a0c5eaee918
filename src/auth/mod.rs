//! Credential verification and the authenticated principal.
//!
//! The login handler only sees the [`Authenticator`] trait. The production
//! implementation, [`StoreAuthenticator`], looks the user up in the
//! [`UserStore`] and checks the submitted password against the stored hash.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::store::UserStore;

pub mod middleware;
pub mod password;
pub mod token;

/// Unauthenticated username/password pair taken from a login request.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Identity attached to a request once authentication succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    /// Granted roles in precedence order.
    pub roles: Vec<String>,
}

impl Principal {
    pub fn new(username: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            username: username.into(),
            roles,
        }
    }

    /// The role written into issued tokens. Accounts hold a single role, so
    /// this is the first entry of `roles`.
    pub fn primary_role(&self) -> Option<&str> {
        self.roles.first().map(String::as_str)
    }
}

#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("unknown user")]
    UnknownUser,
    #[error("bad credentials")]
    BadCredentials,
    #[error("authentication backend failure: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for AuthenticationError {
    fn from(inner: sqlx::Error) -> Self {
        AuthenticationError::Backend(inner.to_string())
    }
}

impl From<argon2::password_hash::Error> for AuthenticationError {
    fn from(inner: argon2::password_hash::Error) -> Self {
        AuthenticationError::Backend(inner.to_string())
    }
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(
        &self,
        credentials: Credentials,
    ) -> Result<Principal, AuthenticationError>;
}

pub struct StoreAuthenticator {
    store: UserStore,
}

impl StoreAuthenticator {
    pub fn new(store: UserStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Authenticator for StoreAuthenticator {
    async fn authenticate(
        &self,
        credentials: Credentials,
    ) -> Result<Principal, AuthenticationError> {
        let user = self
            .store
            .find_by_username(&credentials.username)
            .await?
            .ok_or(AuthenticationError::UnknownUser)?;

        if !password::verify(&credentials.password, &user.password)? {
            return Err(AuthenticationError::BadCredentials);
        }

        Ok(Principal::new(user.username, vec![user.role]))
    }
}
