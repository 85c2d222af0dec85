//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{HealthChecks, HealthResponse, Probe};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: store reachable
/// - **503 Service Unavailable**: store check failed or timed out
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "service": "url-shortener",
///   "version": "0.1.0",
///   "checks": {
///     "database": { "status": "ok" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let checks = HealthChecks {
        database: probe_store(&state).await,
    };
    let response = HealthResponse::new(state.service_name.as_ref(), checks);

    if response.is_healthy() {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn probe_store(state: &AppState) -> Probe {
    match state.link_service.health_check().await {
        Ok(()) => Probe::ok(),
        Err(e) if e.is_deadline_exceeded() => {
            tracing::warn!(error = %e, "store health probe timed out");
            Probe::failed("Store check timed out")
        }
        Err(e) => {
            tracing::warn!(error = %e, "store health probe failed");
            Probe::failed("Store unreachable")
        }
    }
}
