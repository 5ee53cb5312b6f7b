mod handlers;
mod state;
mod static_files;

use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

pub use state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/style.css", get(handlers::style))
        .route("/app.js", get(handlers::script))
        .route("/api/scene", get(handlers::scene))
        .route("/api/map-types", get(handlers::map_types))
        .route("/api/map-type", post(handlers::set_map_type))
        .route("/api/locate", post(handlers::locate))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(state: Arc<AppState>, host: &str, port: u16) -> std::io::Result<()> {
    let app = build_router(state);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(%addr, "map screen server listening");
    eprintln!("  geoscreen listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app).await
}
