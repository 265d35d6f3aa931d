//! HTTP-level tests for the route table and response envelopes.
//!
//! Most tests here run with the in-memory session store and a lazy
//! database pool, so no live services are needed: the auth gate rejects
//! the request before any query runs. The end-to-end flow at the bottom
//! needs PostgreSQL and is skipped unless `DATABASE_URL` is set.

use actix_web::{test, web, App};
use echowall_server::auth::handlers::{login, logout};
use echowall_server::auth::SESSION_HEADER;
use echowall_server::posts::handlers::{create_post, list_posts};
use echowall_server::session::{MemorySessionStore, Session, SessionStore};
use echowall_server::{health_check, AppError, AppState, DbOperations, Settings};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;

fn json_error_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|_err, _req| {
        AppError::ValidationError("Invalid request".to_string()).into()
    })
}

/// State over a lazy pool: nothing connects until a query actually runs.
fn offline_state() -> (web::Data<AppState>, Arc<MemorySessionStore>) {
    let config = Settings::new().expect("Failed to load settings");
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database.url)
        .expect("Failed to build lazy pool");
    let db = DbOperations::new(Arc::new(pool));
    let sessions = Arc::new(MemorySessionStore::new());
    let state = AppState::with_stores(config, db, sessions.clone())
        .expect("Failed to build app state");
    (web::Data::new(state), sessions)
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .app_data(json_error_config())
                .route("/health", web::get().to(health_check))
                .route("/login", web::post().to(login))
                .route("/logout", web::post().to(logout))
                .route("/post", web::post().to(create_post))
                .route("/posts", web::get().to(list_posts)),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health_check() {
    let (state, _) = offline_state();
    let app = init_app!(state);

    let resp = test::TestRequest::get()
        .uri("/health")
        .send_request(&app)
        .await;

    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_protected_route_without_session_header() {
    let (state, _) = offline_state();
    let app = init_app!(state);

    let resp = test::TestRequest::post()
        .uri("/post")
        .set_json(json!({"content": "hello"}))
        .send_request(&app)
        .await;

    assert_eq!(resp.status(), 401);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "No session ID provided");
}

#[actix_web::test]
async fn test_protected_route_with_unknown_token() {
    let (state, _) = offline_state();
    let app = init_app!(state);

    let resp = test::TestRequest::post()
        .uri("/post")
        .insert_header((SESSION_HEADER, "bogus-token"))
        .set_json(json!({"content": "hello"}))
        .send_request(&app)
        .await;

    assert_eq!(resp.status(), 401);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid or expired session");
}

#[actix_web::test]
async fn test_logout_without_header_is_bad_request() {
    let (state, _) = offline_state();
    let app = init_app!(state);

    let resp = test::TestRequest::post()
        .uri("/logout")
        .send_request(&app)
        .await;

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "No session ID provided");
}

#[actix_web::test]
async fn test_logout_with_unknown_token_succeeds() {
    // Revocation is idempotent; logging out an absent session is fine.
    let (state, _) = offline_state();
    let app = init_app!(state);

    let resp = test::TestRequest::post()
        .uri("/logout")
        .insert_header((SESSION_HEADER, "never-issued"))
        .send_request(&app)
        .await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
}

#[actix_web::test]
async fn test_malformed_login_body() {
    let (state, _) = offline_state();
    let app = init_app!(state);

    let resp = test::TestRequest::post()
        .uri("/login")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .send_request(&app)
        .await;

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid request");
}

#[actix_web::test]
async fn test_empty_post_content_is_rejected() {
    // Content validation runs before any database write, so a seeded
    // session is enough to reach it.
    let (state, sessions) = offline_state();
    sessions
        .create(
            "seeded-token",
            &Session::new(1, "testuser".to_string()),
            Duration::from_secs(60),
        )
        .await
        .unwrap();
    let app = init_app!(state);

    let resp = test::TestRequest::post()
        .uri("/post")
        .insert_header((SESSION_HEADER, "seeded-token"))
        .set_json(json!({"content": ""}))
        .send_request(&app)
        .await;

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Content cannot be empty");
}

/// Full login → post → list → logout flow against a real database.
/// Requires `DATABASE_URL`; skipped otherwise.
#[actix_web::test]
async fn test_end_to_end_posting_flow() {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping end-to-end test");
        return;
    };

    let db = DbOperations::new_with_options(&url, 5, Duration::from_secs(5))
        .await
        .expect("Failed to connect to test database");
    db.run_migrations().await.expect("Failed to run migrations");
    db.seed_test_user().await.expect("Failed to seed test user");

    let config = Settings::new().expect("Failed to load settings");
    let sessions = Arc::new(MemorySessionStore::new());
    let state = web::Data::new(
        AppState::with_stores(config, db, sessions).expect("Failed to build app state"),
    );
    let app = init_app!(state);

    // Wrong password is rejected uniformly.
    let resp = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({"username": "testuser", "password": "wrong"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 401);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid credentials");

    // Login with the seeded account.
    let resp = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({"username": "testuser", "password": "password123"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    let token = body["session_id"].as_str().unwrap().to_string();

    // Create a post with a unique marker so the listing assertion is
    // stable against pre-existing rows.
    let marker = format!("hello-{}", uuid::Uuid::new_v4());
    let resp = test::TestRequest::post()
        .uri("/post")
        .insert_header((SESSION_HEADER, token.clone()))
        .set_json(json!({"content": marker}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    let first_post_id = body["post_id"].as_i64().unwrap();
    assert!(first_post_id >= 1);

    // Post ids increment.
    let resp = test::TestRequest::post()
        .uri("/post")
        .insert_header((SESSION_HEADER, token.clone()))
        .set_json(json!({"content": format!("{marker}-2")}))
        .send_request(&app)
        .await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["post_id"].as_i64().unwrap() > first_post_id);

    // Newest first, joined with the author username.
    let resp = test::TestRequest::get()
        .uri("/posts")
        .insert_header((SESSION_HEADER, token.clone()))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    let posts = body["posts"].as_array().unwrap();
    assert_eq!(posts[0]["content"], format!("{marker}-2"));
    assert_eq!(posts[0]["username"], "testuser");
    assert_eq!(posts[1]["content"], marker);

    // Logout, then the token no longer authorizes.
    let resp = test::TestRequest::post()
        .uri("/logout")
        .insert_header((SESSION_HEADER, token.clone()))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);

    let resp = test::TestRequest::post()
        .uri("/post")
        .insert_header((SESSION_HEADER, token))
        .set_json(json!({"content": "after logout"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 401);
}
