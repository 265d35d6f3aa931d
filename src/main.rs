use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use echowall_server::auth::handlers::{login, logout};
use echowall_server::metrics::{metrics_handler, RequestMetrics};
use echowall_server::posts::handlers::{create_post, list_posts};
use echowall_server::{health_check, readiness_check, AppError, AppState, Settings};
use std::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[actix_web::main]
async fn main() -> echowall_server::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();

    // Load configuration
    let config = Settings::new()?;
    info!("Configuration loaded successfully");

    // Initialize application state (PostgreSQL pool, Redis session store)
    let state = AppState::new(config.clone()).await?;

    // Schema first, then the fixed test account.
    state.db.run_migrations().await?;
    state.db.seed_test_user().await?;

    let state = web::Data::new(state);

    let listener = TcpListener::bind(format!("{}:{}", config.server.host, config.server.port))?;
    info!("Starting server at {}:{}", config.server.host, config.server.port);

    let workers = config.server.workers as usize;
    let cors_settings = config.cors.clone();

    // Start HTTP server
    HttpServer::new(move || {
        let cors = if cors_settings.enabled {
            let cors_config = Cors::default();

            let cors_config = if cors_settings.allow_any_origin {
                cors_config
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
            } else {
                cors_config
                    .allowed_origin("http://localhost:8080")
                    .allowed_origin("http://127.0.0.1:8080")
                    .allowed_methods(vec!["GET", "POST"])
                    .allowed_headers(vec!["Content-Type", "X-Session-ID"])
            };

            cors_config.max_age(cors_settings.max_age as usize)
        } else {
            // CORS disabled - use most restrictive settings
            Cors::default()
        };

        // Malformed bodies get the same {success, message} envelope as
        // every other failure.
        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            tracing::debug!(error = %err, "Rejected malformed request body");
            AppError::ValidationError("Invalid request".to_string()).into()
        });

        App::new()
            .wrap(cors)
            .wrap(RequestMetrics::new(state.metrics.clone()))
            .app_data(state.clone())
            .app_data(json_config)
            .route("/health", web::get().to(health_check))
            .route("/ready", web::get().to(readiness_check))
            .route("/metrics", web::get().to(metrics_handler))
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .route("/post", web::post().to(create_post))
            .route("/posts", web::get().to(list_posts))
    })
    .listen(listener)?
    .workers(workers)
    .run()
    .await
    .map_err(|e| AppError::InternalError(e.to_string()))?;

    Ok(())
}
