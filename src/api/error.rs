//! Request-level failures detected before the service is called.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::{Error, ErrorBody, ErrorInfo};

/// Error returned by HTTP handlers.
///
/// Service failures keep their own mapping; malformed requests get
/// endpoint-specific codes (`invalid_request`, `validation_failed`,
/// `invalid_slug`).
#[derive(Debug)]
pub enum ApiError {
    Service(Error),
    BadRequest { code: &'static str, message: String },
}

impl ApiError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            code,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError::Service(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request("invalid_request", rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .next()
            .unwrap_or_else(|| errors.to_string());

        ApiError::bad_request("validation_failed", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Service(e) => e.into_response(),
            ApiError::BadRequest { code, message } => {
                tracing::warn!(code, %message, "rejected request");

                let body = ErrorBody {
                    error: ErrorInfo {
                        code,
                        message,
                        details: json!({}),
                    },
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
        }
    }
}
