// src/routes.rs

use axum::{Router, http::Method, routing::get};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{handlers::health, state::AppState};

/// Assembles the main application router.
///
/// * Mounts the diagnostics endpoint under `/api`.
/// * Serves the static frontend for every other path.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let api_routes = Router::new().route("/health", get(health::health));

    let frontend = ServeDir::new(&state.config.static_dir);

    Router::new()
        .nest("/api", api_routes)
        .fallback_service(frontend)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
