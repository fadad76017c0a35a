// ABOUTME: HTTP server assembly and startup
// ABOUTME: Applies CORS and request tracing to the API router and serves it

use axum::http::{HeaderName, HeaderValue, Method};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use reqhub_api::auth::{TENANT_HEADER, USER_HEADER};
use reqhub_api::{create_router, AppState};

use crate::config::Config;

/// Router with middleware for the given pool
pub fn build_app(pool: SqlitePool, config: &Config) -> anyhow::Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            HeaderName::from_static(TENANT_HEADER),
            HeaderName::from_static(USER_HEADER),
        ]);

    Ok(create_router(AppState::new(pool))
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

/// Open the database, run migrations, and serve until the process is stopped
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let pool = reqhub_storage::init_pool(&config.storage_config()).await?;
    let app = build_app(pool, &config)?;

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Reqhub API listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
