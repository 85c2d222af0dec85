//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::api::error::ApiError;
use crate::state::AppState;
use crate::utils::validation::MAX_SLUG_LENGTH;

/// Redirects a slug to its original URL and records the access.
///
/// # Endpoint
///
/// `GET /{slug}`
///
/// # Errors
///
/// Returns 400 `invalid_slug` for slugs longer than the maximum length,
/// 404 if no live link has the slug, 503 if the store is unavailable.
pub async fn redirect_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    if slug.chars().count() > MAX_SLUG_LENGTH {
        return Err(ApiError::bad_request("invalid_slug", "slug is too long"));
    }

    let original_url = state.link_service.resolve(&slug).await?;

    Ok((StatusCode::FOUND, [(header::LOCATION, original_url)]))
}
