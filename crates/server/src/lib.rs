//! Snake Shop game-economy backend.
//!
//! This crate provides the server as a library, allowing the router to be
//! driven in-process by tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, routing::get};
use tower_http::services::ServeDir;

use state::AppState;

/// Build the application router: health check, API, static frontend, and the
/// request middleware stack.
///
/// Sentry layers are not included; the binary adds them outermost.
pub fn app(state: AppState) -> Router {
    let frontend = ServeDir::new(&state.config().static_dir);

    Router::new()
        .route("/health", get(health))
        .nest("/api", routes::routes())
        .fallback_service(frontend)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(middleware::trace_layer())
        .layer(middleware::cors_layer())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running.
async fn health() -> &'static str {
    "ok"
}
