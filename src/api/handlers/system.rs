//! System endpoints: health check.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` when the store cannot be read.
    status: &'static str,
    timestamp: String,
    version: &'static str,
    /// Most recent date with daily rows.
    #[schema(value_type = Option<String>)]
    latest_date: Option<NaiveDate>,
}

/// `GET /health`: Service and store health.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Reads the store and reports the most recent recorded date. Responds 503 if the store is unreadable.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Store unreadable", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let (code, status, latest_date) = match state.queries.dates().await {
        Ok(dates) => (StatusCode::OK, "healthy", dates.first().copied()),
        Err(e) => {
            tracing::warn!(error = %e, "health check could not read the store");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", None)
        }
    };
    (
        code,
        Json(HealthResponse {
            status,
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION"),
            latest_date,
        }),
    )
}

/// System routes mounted at the root level (not under /api).
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
