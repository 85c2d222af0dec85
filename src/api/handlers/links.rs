//! Handlers for link management endpoints (create, read, delete).

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::link::{CreateLinkRequest, CreateLinkResponse, LinkResponse};
use crate::api::error::ApiError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/some/long/path",
///   "custom_slug": "my-link"
/// }
/// ```
///
/// `custom_slug` is optional; without it a random slug is generated and
/// collisions are retried a bounded number of times.
///
/// # Response Codes
///
/// - **201 Created**: link created
/// - **400 Bad Request**: malformed body (`invalid_request`), missing url
///   (`validation_failed`) or rule violation (`invalid_input`)
/// - **409 Conflict**: custom slug already taken
/// - **503 Service Unavailable**: store unreachable or slug space exhausted
pub async fn create_link_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateLinkResponse>), ApiError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let link = state
        .link_service
        .create(payload.url, payload.custom_slug)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateLinkResponse::from_link(link, &state.base_url)),
    ))
}

/// Returns a live link without counting it as an access.
///
/// # Endpoint
///
/// `GET /api/links/{slug}`
pub async fn get_link_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<LinkResponse>, ApiError> {
    let link = state.link_service.get_by_slug(&slug).await?;

    Ok(Json(LinkResponse::from_link(link, &state.base_url)))
}

/// Soft-deletes a link. Repeated deletes also return 204.
///
/// # Endpoint
///
/// `DELETE /api/links/{slug}`
pub async fn delete_link_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.link_service.delete(&slug).await?;

    Ok(StatusCode::NO_CONTENT)
}
