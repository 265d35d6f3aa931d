use crate::db::DbOperations;
use crate::error::{AppError, AuthError};
use async_trait::async_trait;
use tracing::debug;

/// Identity resolved by a successful credential check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub username: String,
}

/// Credential verification against persisted user records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Verify a username/password pair.
    ///
    /// Unknown username and wrong password are indistinguishable to the
    /// caller; both fail with `AuthError::InvalidCredentials`.
    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, AppError>;
}

/// PostgreSQL-backed credential store using bcrypt password hashes.
pub struct PgCredentialStore {
    db: DbOperations,
}

impl PgCredentialStore {
    pub fn new(db: DbOperations) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, AppError> {
        let user = match self.db.get_user_by_username(username).await? {
            Some(user) => user,
            None => {
                // The unknown-username case is visible only here, never
                // in the response, to avoid username enumeration.
                debug!(username, "login attempt for unknown username");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !bcrypt::verify(password, &user.password_hash)? {
            debug!(username, "password mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }

        Ok(AuthenticatedUser {
            user_id: user.id,
            username: user.username,
        })
    }
}
