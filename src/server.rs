use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::api;
use crate::config::AppConfig;

/// The full application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api::router(state.clone()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Restore any persisted session and serve until the listener fails.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let state = AppState::from_config(Arc::clone(&config));

    match config.storage.file_path() {
        Some(path) => info!(name: "storage.file", path = %path.display(), "using file storage"),
        None => info!(name: "storage.memory", "using in-memory storage"),
    }

    if let Some(session) = state.sessions.restore_session().await {
        info!(
            name: "auth.session.restored",
            identifier = %session.identifier,
            role = %session.role,
            "Restored session from storage"
        );
    }

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
