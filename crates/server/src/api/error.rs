//! HTTP error mapping
//!
//! | Error | Status |
//! |-------|--------|
//! | bad id / body / effective_date | 400 |
//! | unknown record | 404 |
//! | create race surfaced to caller | 409 |
//! | storage or serialization failure | 500 (detail logged only) |
//! | deadline elapsed | 503 |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Errors returned by request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Path id is not a positive integer
    #[error("invalid id; id must be a positive number")]
    InvalidId,

    /// Body is not a JSON object of string or null values
    #[error("invalid input; could not parse json")]
    InvalidBody,

    /// `effective_date` is not `YYYY-MM-DD`
    #[error("invalid effective_date; expected YYYY-MM-DD")]
    InvalidEffectiveDate,

    /// No version exists for the id
    #[error("record of id {0} does not exist")]
    NotFound(i64),

    /// Record already exists
    #[error("record of id {0} already exists")]
    Conflict(i64),

    /// Request deadline elapsed
    #[error("request timed out")]
    Timeout,

    /// Anything the caller cannot fix; the detail is logged, not returned
    #[error("internal error")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidId | ApiError::InvalidBody | ApiError::InvalidEffectiveDate => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<timetravel_core::Error> for ApiError {
    fn from(e: timetravel_core::Error) -> Self {
        use timetravel_core::Error;
        match e {
            Error::InvalidId { .. } => ApiError::InvalidId,
            Error::InvalidDate { .. } => ApiError::InvalidEffectiveDate,
            Error::NotFound { id } => ApiError::NotFound(id),
            Error::AlreadyExists { id } => ApiError::Conflict(id),
            other @ (Error::Serialization { .. } | Error::StorageUnavailable { .. }) => {
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            error!(target: "timetravel::http", error = %detail, "request failed");
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
