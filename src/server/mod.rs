//! HTTP front end: upload form, upload/list endpoints and the chart data feed.
//!
//! The transform core knows nothing about HTTP; this layer reads the uploaded
//! file, hands the decoded table to [`crate::transform::transform`] and maps
//! failures onto status codes via [`error::ApiError`].

pub mod error;
pub mod routes;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::storage::UploadStore;

/// Shared by every handler.
pub struct AppState {
    pub config: AppConfig,
    pub store: UploadStore,
}

/// Assemble the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.server.max_upload_bytes;

    Router::new()
        .route("/", get(routes::index))
        .route("/upload", post(routes::upload))
        .route("/files", get(routes::list_files))
        .route("/data", get(routes::default_data))
        .route("/data/", get(routes::default_data))
        .route("/data/{filename}", get(routes::data))
        .route("/health", get(routes::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until Ctrl+C.
pub async fn serve(config: AppConfig) -> Result<()> {
    let store = UploadStore::open(&config.storage.upload_dir)?;
    let addr = config.bind_addr();
    info!("Upload dir: {:?}", store.root());

    let app = router(Arc::new(AppState { config, store }));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Could not bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, stopping…");
}

// ── Tests ─────────────────────────────────────────────────────────────────────
