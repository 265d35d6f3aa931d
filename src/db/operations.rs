use crate::db::models::{Post, User};
use crate::error::{AppError, DatabaseError};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

// Seeded account for the out-of-scope registration flow.
// The hash is bcrypt("password123") at cost 10.
const SEED_USERNAME: &str = "testuser";
const SEED_PASSWORD_HASH: &str = "$2a$10$q.K91tnoAcTakegqUfk4auCKheDq3dV0VR.PAYsKfGu9qwLo6E6Ai";

#[derive(Clone)]
pub struct DbOperations {
    pool: Arc<PgPool>,
}

impl DbOperations {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn new_with_options(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await
            .map_err(|e| AppError::DatabaseError(DatabaseError::ConnectionError(e.to_string())))?;

        Ok(Self { pool: Arc::new(pool) })
    }

    pub fn pool(&self) -> &PgPool {
        self.pool.as_ref()
    }

    pub async fn run_migrations(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(self.pool.as_ref())
            .await
            .map_err(|e| AppError::DatabaseError(DatabaseError::QueryError(e.to_string())))?;
        Ok(())
    }

    /// Insert the fixed test account if it is not already present.
    pub async fn seed_test_user(&self) -> Result<(), AppError> {
        let result = sqlx::query(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2)
             ON CONFLICT (username) DO NOTHING",
        )
        .bind(SEED_USERNAME)
        .bind(SEED_PASSWORD_HASH)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() > 0 {
            info!("Seeded test user '{}'", SEED_USERNAME);
        }
        Ok(())
    }

    /// Liveness probe for the readiness endpoint.
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    pub async fn create_post(&self, user_id: i32, content: &str) -> Result<i32, AppError> {
        let post_id: i32 = sqlx::query_scalar(
            "INSERT INTO posts (user_id, content) VALUES ($1, $2) RETURNING id",
        )
        .bind(user_id)
        .bind(content)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(post_id)
    }

    /// Most recent posts, newest first, joined with the author username.
    pub async fn list_recent_posts(&self, limit: i64) -> Result<Vec<Post>, AppError> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.user_id, u.username, p.content, p.created_at
            FROM posts p
            JOIN users u ON p.user_id = u.id
            ORDER BY p.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(posts)
    }
}
