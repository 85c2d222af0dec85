//! API route configuration.

use crate::api::handlers::{create_link_handler, delete_link_handler, get_link_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Link management routes, nested under `/api`.
///
/// # Endpoints
///
/// - `POST   /links`          - Create a short link
/// - `GET    /links/{slug}`   - Fetch a live link
/// - `DELETE /links/{slug}`   - Soft-delete a link
pub fn link_routes() -> Router<AppState> {
    Router::new()
        .route("/links", post(create_link_handler))
        .route(
            "/links/{slug}",
            get(get_link_handler).delete(delete_link_handler),
        )
}
