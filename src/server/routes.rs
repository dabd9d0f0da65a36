//! Router configuration for the web server.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let trace_requests = state.trace_requests;

    let router = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/category",
            get(handlers::list_categories).post(handlers::upsert_category),
        )
        .route("/category/:id", delete(handlers::delete_category))
        .route(
            "/image",
            get(handlers::get_images).post(handlers::upsert_image),
        )
        .layer(CorsLayer::permissive());

    let router = if trace_requests {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}
