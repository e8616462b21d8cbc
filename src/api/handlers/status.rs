//! Per-day handlers: resort boards, first-open times, snow reports.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    DateParams, OpenTimesResponse, SnowReportParams, SnowReportResponse, StatusResponse,
    parse_date, required,
};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, TrackerError};

/// `GET /api/status`: Every resort's terrain board for a date.
///
/// # Errors
///
/// Returns [`TrackerError`] on a malformed date or storage failure.
#[utoipa::path(
    get,
    path = "/api/status",
    tag = "Status",
    summary = "Daily terrain board",
    description = "Returns, per resort, the day's snowfall and each tracked terrain's `ever_opened` flag and closed streak. A date with no data yields an empty object.",
    params(DateParams),
    responses(
        (status = 200, description = "Resort boards keyed by resort", body = StatusResponse),
        (status = 400, description = "Malformed date", body = ErrorResponse),
    )
)]
pub async fn status(
    State(state): State<AppState>,
    Query(params): Query<DateParams>,
) -> Result<impl IntoResponse, TrackerError> {
    let date = params.resolve(state.today())?;
    let view = state.queries.daily_view(date).await?;
    Ok(Json(StatusResponse::from(view)))
}

/// `GET /api/open-times`: Earliest open observation per terrain.
///
/// # Errors
///
/// Returns [`TrackerError`] on a malformed date or storage failure.
#[utoipa::path(
    get,
    path = "/api/open-times",
    tag = "Status",
    summary = "First open times",
    description = "Returns the earliest open snapshot timestamp of every terrain that opened on the date.",
    params(DateParams),
    responses(
        (status = 200, description = "First open timestamps", body = OpenTimesResponse),
        (status = 400, description = "Malformed date", body = ErrorResponse),
    )
)]
pub async fn open_times(
    State(state): State<AppState>,
    Query(params): Query<DateParams>,
) -> Result<impl IntoResponse, TrackerError> {
    let date = params.resolve(state.today())?;
    let first_open = state.queries.open_times(date).await?;
    Ok(Json(OpenTimesResponse { date, first_open }))
}

/// `GET /api/snow-report`: Stored narrative report for a resort and date.
///
/// # Errors
///
/// Returns [`TrackerError::MissingParameter`] when `resort` or `date` is
/// absent, [`TrackerError::InvalidDate`] when the date is malformed.
#[utoipa::path(
    get,
    path = "/api/snow-report",
    tag = "Status",
    summary = "Snow report",
    description = "Returns the first substantive narrative captured for the resort on the date, or `null`.",
    params(SnowReportParams),
    responses(
        (status = 200, description = "Snow report", body = SnowReportResponse),
        (status = 400, description = "Missing or malformed parameter", body = ErrorResponse),
    )
)]
pub async fn snow_report(
    State(state): State<AppState>,
    Query(params): Query<SnowReportParams>,
) -> Result<impl IntoResponse, TrackerError> {
    let resort = required(params.resort.as_deref(), "resort")?;
    let date = parse_date(required(params.date.as_deref(), "date")?)?;
    let report = state.queries.snow_report(resort, date).await?;
    Ok(Json(SnowReportResponse {
        resort: resort.to_string(),
        date,
        report_text: report.map(|r| r.report_text),
    }))
}

/// Per-day routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(status))
        .route("/open-times", get(open_times))
        .route("/snow-report", get(snow_report))
}
