pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod metrics;
pub mod posts;
pub mod session;

use std::sync::Arc;
use std::time::Duration;
use actix_web::{web, HttpResponse};

use crate::auth::{AuthGate, PgCredentialStore};
use crate::metrics::Metrics;
use crate::session::{RedisSessionStore, SessionStore};

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use auth::Identity;
pub use db::{DbOperations, Post, User};

const DB_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Liveness endpoint handler. Always 200.
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Readiness endpoint handler: 200 once the relational store answers a
/// ping, 503 otherwise.
pub async fn readiness_check(state: web::Data<AppState>) -> HttpResponse {
    match state.db.ping().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({"status": "ready"})),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "not ready",
                "reason": "database unavailable"
            }))
        }
    }
}

/// Application state shared across all components
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub db: DbOperations,
    pub auth: Arc<AuthGate>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Connect the production stores (PostgreSQL, Redis) and assemble
    /// the application state around them.
    pub async fn new(config: Settings) -> Result<Self> {
        let db = DbOperations::new_with_options(
            &config.database.url,
            config.database.max_connections,
            DB_ACQUIRE_TIMEOUT,
        )
        .await?;
        let sessions: Arc<dyn SessionStore> =
            Arc::new(RedisSessionStore::connect(&config.redis.url).await?);
        Self::with_stores(config, db, sessions)
    }

    /// Assemble state around injected stores. Tests use this to swap in
    /// the in-memory session store.
    pub fn with_stores(
        config: Settings,
        db: DbOperations,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        let credentials = Arc::new(PgCredentialStore::new(db.clone()));
        let session_ttl =
            Duration::from_secs(config.auth.session_ttl_hours.max(0) as u64 * 3600);
        let auth = Arc::new(AuthGate::new(credentials, sessions, session_ttl));
        let metrics = Arc::new(Metrics::new()?);

        Ok(Self {
            config: Arc::new(config),
            db,
            auth,
            metrics,
        })
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.db.pool().close().await;
        Ok(())
    }
}
