//! Longitudinal handlers: dates, the full matrix, and per-key calendars.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    SnowCalendarParams, SnowCalendarResponse, TerrainCalendarParams, TerrainCalendarResponse,
    required,
};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, TrackerError};
use crate::service::FullHistory;

/// `GET /api/dates`: Recorded dates, newest first.
///
/// # Errors
///
/// Returns [`TrackerError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/dates",
    tag = "History",
    summary = "Recorded dates",
    description = "Returns every date with at least one daily row, newest first.",
    responses(
        (status = 200, description = "Dates as YYYY-MM-DD", body = Vec<String>),
    )
)]
pub async fn dates(State(state): State<AppState>) -> Result<impl IntoResponse, TrackerError> {
    Ok(Json(state.queries.dates().await?))
}

/// `GET /api/history`: Full date × terrain matrix with snowfall.
///
/// # Errors
///
/// Returns [`TrackerError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/history",
    tag = "History",
    summary = "Full history",
    description = "Returns ascending dates, `resort|terrain` to date to `ever_opened`, and resort to date to snowfall.",
    responses(
        (status = 200, description = "History matrix", body = FullHistory),
    )
)]
pub async fn full_history(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, TrackerError> {
    Ok(Json(state.queries.full_history().await?))
}

/// `GET /api/terrain-calendar`: `ever_opened` per date for one terrain.
///
/// # Errors
///
/// Returns [`TrackerError::MissingParameter`] when `resort` or `terrain` is
/// absent.
#[utoipa::path(
    get,
    path = "/api/terrain-calendar",
    tag = "History",
    summary = "Terrain calendar",
    description = "Returns `ever_opened` per date for one terrain. Untracked terrain yields an empty calendar.",
    params(TerrainCalendarParams),
    responses(
        (status = 200, description = "Terrain calendar", body = TerrainCalendarResponse),
        (status = 400, description = "Missing parameter", body = ErrorResponse),
    )
)]
pub async fn terrain_calendar(
    State(state): State<AppState>,
    Query(params): Query<TerrainCalendarParams>,
) -> Result<impl IntoResponse, TrackerError> {
    let resort = required(params.resort.as_deref(), "resort")?;
    let terrain = required(params.terrain.as_deref(), "terrain")?;
    let days = state.queries.terrain_history(resort, terrain).await?;
    Ok(Json(TerrainCalendarResponse {
        resort: resort.to_string(),
        terrain: terrain.to_string(),
        days,
    }))
}

/// `GET /api/snow-calendar`: Snowfall per date for one resort.
///
/// # Errors
///
/// Returns [`TrackerError::MissingParameter`] when `resort` is absent.
#[utoipa::path(
    get,
    path = "/api/snow-calendar",
    tag = "History",
    summary = "Snow calendar",
    description = "Returns 24-hour snowfall per date for one resort. Unknown resorts yield an empty calendar.",
    params(SnowCalendarParams),
    responses(
        (status = 200, description = "Snow calendar", body = SnowCalendarResponse),
        (status = 400, description = "Missing parameter", body = ErrorResponse),
    )
)]
pub async fn snow_calendar(
    State(state): State<AppState>,
    Query(params): Query<SnowCalendarParams>,
) -> Result<impl IntoResponse, TrackerError> {
    let resort = required(params.resort.as_deref(), "resort")?;
    let days = state.queries.resort_snow_history(resort).await?;
    Ok(Json(SnowCalendarResponse {
        resort: resort.to_string(),
        days,
    }))
}

/// History routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dates", get(dates))
        .route("/history", get(full_history))
        .route("/terrain-calendar", get(terrain_calendar))
        .route("/snow-calendar", get(snow_calendar))
}
