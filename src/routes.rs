//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{slug}`      - Short link redirect
//! - `GET  /health`      - Health check
//! - `/api/*`            - Link management API
//!
//! # Middleware (outermost first)
//!
//! - **Path normalization** - Trailing slash handling
//! - **Panic catcher** - Converts handler panics into a 500 JSON error
//! - **Request id** - `x-request-id` set if absent and echoed on the response
//! - **Tracing** - Structured request/response logging
//! - **CORS** - Permissive
//! - **Body limit** - 1 MiB request bodies

use std::any::Any;

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{request_id, tracing};
use crate::error::Error;
use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower::{Layer, ServiceBuilder};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

/// Routes and middleware without path normalization.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/{slug}", get(redirect_handler))
        .route("/health", get(health_handler))
        .nest("/api", api::routes::link_routes())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(panic_response))
                .layer(request_id::set_layer())
                .layer(tracing::layer())
                .layer(request_id::propagate_layer())
                .layer(CorsLayer::permissive()),
        )
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());

    Error::internal("http.handler", format!("handler panicked: {}", detail)).into_response()
}
