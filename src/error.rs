//! Tracker error types with HTTP status code mapping.
//!
//! [`TrackerError`] is the central error type for the tracker. Adapter and
//! fetch failures never leave the scrape cycle; contract violations on the
//! aggregation path are rejected loudly; query-side variants map to a
//! specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1003,
///     "message": "missing required parameter: resort"
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
}

/// Tracker error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                |
/// |-----------|-----------------|----------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request            |
/// | 2000–2999 | Scrape / Fetch  | 502 Bad Gateway            |
/// | 3000–3999 | Server          | 500 Internal Server Error  |
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// Resort identifier is not in the catalogue.
    #[error("unknown resort: {0}")]
    UnknownResort(String),

    /// Terrain name is not tracked for the resort.
    #[error("terrain {terrain:?} is not tracked at {resort}")]
    UnknownTerrain {
        /// Resort identifier.
        resort: String,
        /// Offending terrain name.
        terrain: String,
    },

    /// Date string is not `YYYY-MM-DD`.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// Observation values violate the merge contract.
    #[error("invalid observation: {0}")]
    InvalidObservation(String),

    /// A required query parameter was not supplied.
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// Adapter could not interpret the page.
    #[error("scrape failed for {resort}: {message}")]
    Scrape {
        /// Resort identifier.
        resort: String,
        /// Failure description.
        message: String,
    },

    /// Page retrieval failed.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// Adapter exceeded its time budget.
    #[error("{resort} adapter timed out after {secs}s")]
    Timeout {
        /// Resort identifier.
        resort: String,
        /// Budget that was exceeded, in seconds.
        secs: u64,
    },

    /// Built-in pattern or selector failed to compile.
    #[error("invalid built-in pattern: {0}")]
    Pattern(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TrackerError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::UnknownResort(_) => 1001,
            Self::UnknownTerrain { .. } => 1002,
            Self::MissingParameter(_) => 1003,
            Self::InvalidDate(_) => 1004,
            Self::InvalidObservation(_) => 1005,
            Self::Scrape { .. } => 2001,
            Self::Fetch(_) => 2002,
            Self::Timeout { .. } => 2003,
            Self::Internal(_) => 3000,
            Self::Persistence(_) => 3001,
            Self::Pattern(_) => 3002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownResort(_)
            | Self::UnknownTerrain { .. }
            | Self::MissingParameter(_)
            | Self::InvalidDate(_)
            | Self::InvalidObservation(_) => StatusCode::BAD_REQUEST,
            Self::Scrape { .. } | Self::Fetch(_) | Self::Timeout { .. } => StatusCode::BAD_GATEWAY,
            Self::Persistence(_) | Self::Pattern(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<sqlx::Error> for TrackerError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<reqwest::Error> for TrackerError {
    fn from(err: reqwest::Error) -> Self {
        Self::Fetch(err.to_string())
    }
}

impl From<regex::Error> for TrackerError {
    fn from(err: regex::Error) -> Self {
        Self::Pattern(err.to_string())
    }
}

impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
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
    fn validation_errors_are_bad_request() {
        let err = TrackerError::MissingParameter("resort");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), 1003);
        assert_eq!(err.to_string(), "missing required parameter: resort");
    }

    #[test]
    fn persistence_errors_are_server_errors() {
        let err = TrackerError::Persistence("disk full".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn into_response_sets_status() {
        let response = TrackerError::InvalidDate("2025-13-01".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
