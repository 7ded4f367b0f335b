//! `api` crate — HTTP REST API layer.
//!
//! Exposes:
//!   GET    /ping
//!   POST   /configurations
//!   GET    /configurations/{repo}
//!   PUT    /configurations/{repo}
//!   DELETE /configurations/{repo}

pub mod error;
pub mod handlers;
pub mod view;

use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::ApiError;
pub use handlers::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route(
            "/configurations",
            axum::routing::post(handlers::configurations::create),
        )
        .route(
            "/configurations/:repo",
            get(handlers::configurations::show)
                .put(handlers::configurations::update)
                .delete(handlers::configurations::delete),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on `addr` until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
