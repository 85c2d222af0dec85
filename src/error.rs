//! Error taxonomy shared by every layer of the service.
//!
//! Every failure that crosses a component boundary is an [`Error`] carrying
//! three things:
//!
//! - an operation label (`op`) naming where it happened, e.g. `link_service.create`
//! - a [`Kind`] that callers branch on
//! - a [`Cause`] that keeps the original failure inspectable
//!
//! Classification happens once, at the boundary that has the context to do it
//! (for storage that is [`crate::utils::db_error`] and the in-memory store).
//! Layers above either pass the kind through with [`Error::wrap`] or impose
//! their own with [`Error::reclassify`]; nobody re-derives a kind from a raw
//! cause.
//!
//! The HTTP mapping lives here as well: [`Error`] implements
//! [`IntoResponse`] so handlers can return `Result<_, Error>` directly.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt;

/// Boxed error used for causes that come from outside the taxonomy.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used across the service and repository layers.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Closed set of error classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Kind {
    #[default]
    Unknown,
    NotFound,
    Conflict,
    Invalid,
    Unauthorized,
    Forbidden,
    Unavailable,
    Internal,
}

impl Kind {
    /// HTTP status code for this kind.
    pub fn status_code(self) -> StatusCode {
        match self {
            Kind::NotFound => StatusCode::NOT_FOUND,
            Kind::Conflict => StatusCode::CONFLICT,
            Kind::Invalid => StatusCode::BAD_REQUEST,
            Kind::Unauthorized => StatusCode::UNAUTHORIZED,
            Kind::Forbidden => StatusCode::FORBIDDEN,
            Kind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Kind::Internal | Kind::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code used in JSON responses.
    pub fn code(self) -> &'static str {
        match self {
            Kind::NotFound => "not_found",
            Kind::Conflict => "conflict",
            Kind::Invalid => "invalid_input",
            Kind::Unauthorized => "unauthorized",
            Kind::Forbidden => "forbidden",
            Kind::Unavailable => "unavailable",
            Kind::Internal | Kind::Unknown => "internal_error",
        }
    }

    /// Whether the caller can fix the request and try again.
    pub fn is_client_error(self) -> bool {
        matches!(
            self,
            Kind::NotFound | Kind::Conflict | Kind::Invalid | Kind::Unauthorized | Kind::Forbidden
        )
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Unknown => "Unknown",
            Kind::NotFound => "NotFound",
            Kind::Conflict => "Conflict",
            Kind::Invalid => "Invalid",
            Kind::Unauthorized => "Unauthorized",
            Kind::Forbidden => "Forbidden",
            Kind::Unavailable => "Unavailable",
            Kind::Internal => "Internal",
        };
        f.write_str(name)
    }
}

/// What an [`Error`] wraps.
#[derive(Debug)]
pub enum Cause {
    /// An error from a lower layer, already classified.
    Wrapped(Box<Error>),
    /// A deadline expired or the operation was cancelled before completing.
    DeadlineExceeded,
    /// A failure from outside the taxonomy (driver, OS, parser, ...).
    External(BoxError),
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::Wrapped(inner) => write!(f, "{}", inner),
            Cause::DeadlineExceeded => f.write_str("deadline exceeded"),
            Cause::External(e) => write!(f, "{}", e),
        }
    }
}

/// Classified service error.
#[derive(Debug)]
pub struct Error {
    op: &'static str,
    kind: Kind,
    cause: Cause,
}

impl Error {
    /// Classifies an external failure.
    pub fn new(op: &'static str, kind: Kind, cause: impl Into<BoxError>) -> Self {
        Self {
            op,
            kind,
            cause: Cause::External(cause.into()),
        }
    }

    /// Wraps a lower-layer error, keeping its kind.
    pub fn wrap(op: &'static str, inner: Error) -> Self {
        Self {
            op,
            kind: inner.kind,
            cause: Cause::Wrapped(Box::new(inner)),
        }
    }

    /// Wraps a lower-layer error under a kind decided by this layer.
    pub fn reclassify(op: &'static str, kind: Kind, inner: Error) -> Self {
        Self {
            op,
            kind,
            cause: Cause::Wrapped(Box::new(inner)),
        }
    }

    /// An operation that ran out of time. Always [`Kind::Unavailable`].
    pub fn deadline_exceeded(op: &'static str) -> Self {
        Self {
            op,
            kind: Kind::Unavailable,
            cause: Cause::DeadlineExceeded,
        }
    }

    pub fn invalid(op: &'static str, cause: impl Into<BoxError>) -> Self {
        Self::new(op, Kind::Invalid, cause)
    }

    pub fn not_found(op: &'static str, cause: impl Into<BoxError>) -> Self {
        Self::new(op, Kind::NotFound, cause)
    }

    pub fn conflict(op: &'static str, cause: impl Into<BoxError>) -> Self {
        Self::new(op, Kind::Conflict, cause)
    }

    pub fn unavailable(op: &'static str, cause: impl Into<BoxError>) -> Self {
        Self::new(op, Kind::Unavailable, cause)
    }

    pub fn internal(op: &'static str, cause: impl Into<BoxError>) -> Self {
        Self::new(op, Kind::Internal, cause)
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn op(&self) -> &'static str {
        self.op
    }

    pub fn cause(&self) -> &Cause {
        &self.cause
    }

    /// Operation labels from the outermost layer down to the origin.
    pub fn ops(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::successors(Some(self), |e| match &e.cause {
            Cause::Wrapped(inner) => Some(inner.as_ref()),
            _ => None,
        })
        .map(|e| e.op)
    }

    /// The innermost [`Error`] of the chain.
    pub fn origin(&self) -> &Error {
        let mut current = self;
        while let Cause::Wrapped(inner) = &current.cause {
            current = inner;
        }
        current
    }

    /// True if the chain ends in a deadline/cancellation.
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self.origin().cause, Cause::DeadlineExceeded)
    }

    /// Message of the innermost cause, without operation labels.
    ///
    /// Only safe to show to callers for client error kinds.
    pub fn root_message(&self) -> String {
        self.origin().cause.to_string()
    }

    /// Renders the public JSON error payload for this error.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (message, details) = match self.kind {
            Kind::Invalid => (self.root_message(), json!({})),
            Kind::Conflict => (
                "This slug is already taken".to_string(),
                json!({ "hint": "Try a different custom slug or let us generate one for you" }),
            ),
            Kind::NotFound => ("Short link doesn't exist".to_string(), json!({})),
            Kind::Unauthorized => ("Authentication required".to_string(), json!({})),
            Kind::Forbidden => ("Access denied".to_string(), json!({})),
            Kind::Unavailable => (
                "The service is temporarily unavailable. Please try again.".to_string(),
                json!({}),
            ),
            Kind::Internal | Kind::Unknown => {
                ("An unexpected error occurred".to_string(), json!({}))
            }
        };

        ErrorInfo {
            code: self.kind.code(),
            message,
            details,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.op.is_empty() {
            write!(f, "{}", self.cause)
        } else {
            write!(f, "{}: {}", self.op, self.cause)
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.cause {
            Cause::Wrapped(inner) => Some(inner.as_ref()),
            Cause::DeadlineExceeded => None,
            Cause::External(e) => Some(e.as_ref()),
        }
    }
}

/// JSON envelope for every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorInfo,
}

/// Public part of an error returned to HTTP clients.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let ops: Vec<&str> = self.ops().collect();
        if self.kind.is_client_error() {
            tracing::warn!(error = %self, kind = %self.kind, ops = ?ops, "request failed");
        } else {
            tracing::error!(error = %self, kind = %self.kind, ops = ?ops, "request failed");
        }

        let status = self.kind.status_code();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}
