//! Router and server lifecycle.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use resumable_storage::LocalStorage;
use resumable_transfer::UploadService;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::handlers;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub uploads: UploadService<LocalStorage>,
}

/// Builds the HTTP routes.
pub fn router(state: AppState, max_chunk_body: usize) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(
            "/upload",
            post(handlers::upload).layer(DefaultBodyLimit::max(max_chunk_body)),
        )
        .route("/verify", post(handlers::verify))
        .route("/merge", post(handlers::merge))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves until Ctrl-C.
pub async fn run(config: Config) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let storage = LocalStorage::new(&config.upload_dir);
    let state = AppState {
        uploads: UploadService::with_merge_concurrency(storage, config.merge_concurrency),
    };
    let app = router(state, config.max_chunk_body);

    let listener = TcpListener::bind(config.listen).await?;
    tracing::info!(addr = %listener.local_addr()?, "upload server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
