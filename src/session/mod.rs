//! Session storage for echowall-server
//!
//! Sessions are opaque-token key-value records with a fixed TTL. The
//! store owns all session state; the auth gate only mediates access.

mod memory;
mod redis;

pub use self::memory::MemorySessionStore;
pub use self::redis::RedisSessionStore;

use crate::error::SessionError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Payload stored against a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub user_id: i32,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: i32, username: String) -> Self {
        Self {
            user_id,
            username,
            created_at: Utc::now(),
        }
    }
}

/// Key-value session storage with TTL expiry.
///
/// Expiry is fixed at creation time; lookups never extend it. The
/// backing store enforces the TTL, so an expired record reads as absent.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a session under the token for `ttl`. One write.
    async fn create(&self, token: &str, session: &Session, ttl: Duration)
        -> Result<(), SessionError>;

    /// Fetch the session for a token. `None` if absent or expired.
    async fn lookup(&self, token: &str) -> Result<Option<Session>, SessionError>;

    /// Delete the session. Idempotent: revoking an absent token succeeds.
    async fn revoke(&self, token: &str) -> Result<(), SessionError>;
}
