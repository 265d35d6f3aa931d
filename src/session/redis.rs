use crate::error::SessionError;
use crate::session::{Session, SessionStore};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::info;

const SESSION_KEY_PREFIX: &str = "session:";

fn session_key(token: &str) -> String {
    format!("{}{}", SESSION_KEY_PREFIX, token)
}

/// Redis-backed session store.
///
/// Records are stored as JSON under `session:<token>` with the TTL
/// applied via `SET EX`, so Redis itself expires stale sessions.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
}

impl RedisSessionStore {
    pub async fn connect(url: &str) -> Result<Self, SessionError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        info!("Connected to Redis session store");
        Ok(Self { conn })
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(
        &self,
        token: &str,
        session: &Session,
        ttl: Duration,
    ) -> Result<(), SessionError> {
        let payload = serde_json::to_string(session)?;
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(session_key(token), payload, ttl.as_secs())
            .await?;
        Ok(())
    }

    async fn lookup(&self, token: &str) -> Result<Option<Session>, SessionError> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn.get(session_key(token)).await?;
        match payload {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    async fn revoke(&self, token: &str) -> Result<(), SessionError> {
        let mut conn = self.conn.clone();
        // DEL of an absent key is a no-op in Redis, which gives us
        // idempotent revocation for free.
        conn.del::<_, ()>(session_key(token)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_namespacing() {
        assert_eq!(session_key("abc123"), "session:abc123");
    }
}
