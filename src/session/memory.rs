use crate::error::SessionError;
use crate::session::{Session, SessionStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

struct Entry {
    session: Session,
    expires_at: Instant,
}

/// In-process session store for tests and local development.
///
/// Same contract as the Redis store: per-token atomic operations and
/// TTL expiry, here checked against a deadline on each lookup.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) sessions.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries.values().filter(|e| e.expires_at > now).count()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(
        &self,
        token: &str,
        session: &Session,
        ttl: Duration,
    ) -> Result<(), SessionError> {
        let mut entries = self.entries.write().await;
        entries.insert(
            token.to_string(),
            Entry {
                session: session.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn lookup(&self, token: &str) -> Result<Option<Session>, SessionError> {
        {
            let entries = self.entries.read().await;
            match entries.get(token) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.session.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }
        // Expired entry: drop it so the map doesn't accumulate stale keys.
        let mut entries = self.entries.write().await;
        entries.remove(token);
        Ok(None)
    }

    async fn revoke(&self, token: &str) -> Result<(), SessionError> {
        let mut entries = self.entries.write().await;
        entries.remove(token);
        Ok(())
    }
}
