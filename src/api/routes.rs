use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::config::{Config, CorsOrigin};
use crate::AppState;

/// Room for the text fields and multipart framing around the cover itself.
const FORM_OVERHEAD: usize = 64 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_size as usize + FORM_OVERHEAD;
    let cors = cors_layer(&state.config);

    Router::new()
        // Books
        .route("/buku", get(handlers::list_books))
        .route(
            "/buku",
            post(handlers::create_book).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/buku/:id", put(handlers::update_book))
        .route("/buku/:id", delete(handlers::delete_book))
        // Covers
        .route("/cover/:id", get(handlers::get_cover))
        // Identity
        .route("/check-auth", get(handlers::check_auth))
        // Internal
        .route("/_internal/health", get(handlers::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    match &config.server.cors_origin {
        CorsOrigin::Any => layer.allow_origin(Any),
        CorsOrigin::Exact(origin) => layer.allow_origin(origin.clone()),
    }
}
