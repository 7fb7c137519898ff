//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::get,
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::domains::reviews::routes::{self as review_routes, ReviewsState};
use crate::domains::reviews::ReviewRuleEngine;
use crate::kernel::ServerDeps;
use crate::server::routes::health_handler;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// None when the app runs on in-memory dependencies
    pub db_pool: Option<PgPool>,
}

/// Build the Axum application router
pub fn build_app(server_deps: ServerDeps, db_pool: Option<PgPool>) -> Router {
    let engine = Arc::new(ReviewRuleEngine::new(&server_deps));
    let app_state = AppState { db_pool };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        // Health check
        .route("/health", get(health_handler))
        .merge(review_routes::router(ReviewsState { engine }))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
