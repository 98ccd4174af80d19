//! Engine error types with HTTP status code mapping.
//!
//! [`EngineError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{EntryId, Season};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "entry 1234 has no ledger row in season 2"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category           | HTTP Status                  |
/// |-----------|--------------------|------------------------------|
/// | 1000–1999 | Validation         | 400 Bad Request              |
/// | 2000–2999 | Not Found/Conflict | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server             | 500 Internal Server Error    |
/// | 4000–4999 | Engine State       | 422 Unprocessable Entity     |
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The entry has no ledger row in the season being voted on or read.
    #[error("entry {entry_id} has no ledger row in season {season}")]
    EntryNotFound {
        /// Missing entry.
        entry_id: EntryId,
        /// Season that was searched.
        season: Season,
    },

    /// An entry with this id already exists.
    #[error("entry {0} already exists")]
    EntryConflict(EntryId),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Fewer than two entries are available to pair.
    #[error("cannot select a pair from {0} entries")]
    InsufficientEntries(usize),

    /// The durable store could not be reached or did not commit.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::EntryNotFound { .. } => 2001,
            Self::EntryConflict(_) => 2002,
            Self::Internal(_) => 3000,
            Self::StoreUnavailable(_) => 3001,
            Self::InsufficientEntries(_) => 4001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::EntryNotFound { .. } => StatusCode::NOT_FOUND,
            Self::EntryConflict(_) => StatusCode::CONFLICT,
            Self::InsufficientEntries(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::StoreUnavailable(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let err = EngineError::EntryNotFound {
            entry_id: EntryId::new("42"),
            season: Season::new(2),
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), 2001);
        assert_eq!(err.to_string(), "entry 42 has no ledger row in season 2");
    }

    #[test]
    fn store_failures_are_server_errors() {
        let err = EngineError::StoreUnavailable("connection refused".to_string());
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn degenerate_pool_is_unprocessable() {
        let err = EngineError::InsufficientEntries(1);
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
