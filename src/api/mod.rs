//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Read-only. Data endpoints are mounted under `/api`, the health check at
//! the root. With the `swagger-ui` feature the OpenAPI document is served
//! at `/api-docs/openapi.json` and browsable at `/swagger-ui`.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document for every endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "terrain-tracker", description = "Ski resort terrain opening history"),
    paths(
        handlers::system::health_handler,
        handlers::status::status,
        handlers::status::open_times,
        handlers::status::snow_report,
        handlers::history::dates,
        handlers::history::full_history,
        handlers::history::terrain_calendar,
        handlers::history::snow_calendar,
    ),
    components(schemas(crate::error::ErrorResponse, crate::error::ErrorBody)),
    tags(
        (name = "System", description = "Liveness"),
        (name = "Status", description = "Per-day terrain boards and reports"),
        (name = "History", description = "Longitudinal views"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use chrono::{FixedOffset, NaiveDate, TimeZone};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::domain::{DailyObservation, Resort, SnowReport, TerrainKey, TerrainStatus};
    use crate::persistence::{MemoryStore, TerrainStore};
    use crate::service::QueryService;

    fn day(d: u32) -> NaiveDate {
        let Some(date) = NaiveDate::from_ymd_opt(2026, 1, d) else {
            panic!("valid date");
        };
        date
    }

    async fn merge(store: &MemoryStore, terrain: &str, d: u32, status: TerrainStatus) {
        let Ok(key) = TerrainKey::parse("snowbird", terrain) else {
            panic!("tracked terrain");
        };
        let Ok(obs) = DailyObservation::new(key, day(d), status, f64::from(d)) else {
            panic!("valid observation");
        };
        tokio_test::assert_ok!(store.merge_daily(&obs).await);
    }

    async fn app() -> Router {
        let store = Arc::new(MemoryStore::new());
        merge(&store, "High Baldy", 1, TerrainStatus::Closed).await;
        merge(&store, "High Baldy", 2, TerrainStatus::Closed).await;
        merge(&store, "Mineral Basin", 2, TerrainStatus::Open).await;

        let Some(offset) = FixedOffset::west_opt(7 * 3600) else {
            panic!("valid offset");
        };
        let Some(fetched_at) = offset.with_ymd_and_hms(2026, 1, 2, 7, 0, 0).single() else {
            panic!("valid timestamp");
        };
        let report = SnowReport {
            resort: Resort::Snowbird,
            date: day(2),
            report_text: "Six inches overnight with more on the way this afternoon.".to_string(),
            fetched_at,
        };
        tokio_test::assert_ok!(store.save_snow_report(&report).await);

        let state = AppState::new(Arc::new(QueryService::new(store)), offset);
        build_router().with_state(state)
    }

    async fn get(uri: &str) -> (StatusCode, Value) {
        let Ok(request) = Request::builder().uri(uri).body(Body::empty()) else {
            panic!("valid request");
        };
        let Ok(response) = app().await.oneshot(request).await;
        let status = response.status();
        let Ok(bytes) = to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body readable");
        };
        let Ok(body) = serde_json::from_slice(&bytes) else {
            panic!("body is json");
        };
        (status, body)
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = get("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get("status"), Some(&json!("healthy")));
        assert_eq!(body.get("latest_date"), Some(&json!("2026-01-02")));
    }

    #[tokio::test]
    async fn status_lists_boards_with_streaks() {
        let (status, body) = get("/api/status?date=2026-01-02").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.pointer("/snowbird/snow_24hr"), Some(&json!(2.0)));
        assert_eq!(
            body.pointer("/snowbird/terrain/0"),
            Some(&json!({"name": "High Baldy", "ever_opened": false, "closed_streak": 2}))
        );
        assert_eq!(
            body.pointer("/snowbird/terrain/1"),
            Some(&json!({"name": "Mineral Basin", "ever_opened": true, "closed_streak": 0}))
        );
    }

    #[tokio::test]
    async fn status_for_empty_day_is_empty_object() {
        let (status, body) = get("/api/status?date=2026-01-20").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({}));
    }

    #[tokio::test]
    async fn malformed_date_is_bad_request() {
        let (status, body) = get("/api/status?date=01-02-2026").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.pointer("/error/code"), Some(&json!(1004)));
    }

    #[tokio::test]
    async fn dates_are_newest_first() {
        let (_, body) = get("/api/dates").await;
        assert_eq!(body, json!(["2026-01-02", "2026-01-01"]));
    }

    #[tokio::test]
    async fn history_matrix_is_keyed_by_terrain() {
        let (_, body) = get("/api/history").await;
        assert_eq!(body.get("dates"), Some(&json!(["2026-01-01", "2026-01-02"])));
        assert_eq!(
            body.pointer("/terrain/snowbird|High Baldy"),
            Some(&json!({"2026-01-01": false, "2026-01-02": false}))
        );
        assert_eq!(
            body.pointer("/snow/snowbird"),
            Some(&json!({"2026-01-01": 1.0, "2026-01-02": 2.0}))
        );
    }

    #[tokio::test]
    async fn calendars_require_their_parameters() {
        let (status, body) = get("/api/terrain-calendar?resort=snowbird").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.pointer("/error/code"), Some(&json!(1003)));

        let (status, _) = get("/api/snow-calendar").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get("/api/snow-report?resort=snowbird").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn terrain_calendar_echoes_request() {
        let (status, body) =
            get("/api/terrain-calendar?resort=snowbird&terrain=Mineral%20Basin").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get("terrain"), Some(&json!("Mineral Basin")));
        assert_eq!(body.get("days"), Some(&json!({"2026-01-02": true})));
    }

    #[tokio::test]
    async fn unknown_resort_yields_empty_calendar() {
        let (status, body) = get("/api/snow-calendar?resort=alta").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"resort": "alta", "days": {}}));
    }

    #[tokio::test]
    async fn snow_report_returns_stored_text_or_null() {
        let (_, body) = get("/api/snow-report?resort=snowbird&date=2026-01-02").await;
        assert_eq!(
            body.get("report_text"),
            Some(&json!("Six inches overnight with more on the way this afternoon."))
        );
        let (_, body) = get("/api/snow-report?resort=snowbird&date=2026-01-01").await;
        assert_eq!(body.get("report_text"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn open_times_empty_without_snapshots() {
        let (status, body) = get("/api/open-times?date=2026-01-02").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get("first_open"), Some(&json!({})));
    }

    #[test]
    fn openapi_lists_every_endpoint() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/status",
            "/api/open-times",
            "/api/snow-report",
            "/api/dates",
            "/api/history",
            "/api/terrain-calendar",
            "/api/snow-calendar",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
