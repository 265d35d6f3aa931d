use crate::auth::credentials::CredentialStore;
use crate::error::{AppError, AuthError};
use crate::session::{Session, SessionStore};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const TOKEN_BYTES: usize = 32;

/// Identity resolved from a session, valid for a single request.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i32,
    pub username: String,
}

/// Mediates login, authorization and logout over injected stores.
///
/// The gate holds no session state of its own; every decision is one
/// call against the credential store or the session store.
pub struct AuthGate {
    credentials: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionStore>,
    session_ttl: Duration,
}

impl AuthGate {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            credentials,
            sessions,
            session_ttl,
        }
    }

    /// Verify credentials and issue a fresh session token.
    ///
    /// On credential failure no session is written. Concurrent logins by
    /// the same user yield independent tokens.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        let user = match self.credentials.verify_credentials(username, password).await {
            Ok(user) => user,
            Err(e) => {
                warn!(username, "login rejected");
                return Err(e);
            }
        };

        let token = generate_token();
        let session = Session::new(user.user_id, user.username.clone());
        self.sessions
            .create(&token, &session, self.session_ttl)
            .await?;

        info!(username = %user.username, user_id = user.user_id, "login successful");
        Ok(token)
    }

    /// Resolve a token to an identity for the current request.
    pub async fn authorize(&self, token: &str) -> Result<Identity, AppError> {
        let session = self
            .sessions
            .lookup(token)
            .await?
            .ok_or(AuthError::InvalidSession)?;

        Ok(Identity {
            user_id: session.user_id,
            username: session.username,
        })
    }

    /// Revoke a session. No ownership check is performed: any caller
    /// that knows the token value can revoke it.
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        self.sessions.revoke(token).await?;
        info!("session revoked");
        Ok(())
    }
}

/// 32 bytes from the OS CSPRNG, URL-safe base64 without padding.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
