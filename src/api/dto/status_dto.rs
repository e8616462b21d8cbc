//! DTOs for the daily status, open-times, and snow-report endpoints.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Resort;
use crate::service::{DailyView, TerrainDay};

/// Response body for `GET /api/status`: resort to its terrain board.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct StatusResponse(pub BTreeMap<Resort, ResortStatusDto>);

impl From<DailyView> for StatusResponse {
    fn from(view: DailyView) -> Self {
        Self(
            view.into_iter()
                .map(|(resort, rows)| (resort, ResortStatusDto::from_rows(&rows)))
                .collect(),
        )
    }
}

/// One resort's board for the day.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ResortStatusDto {
    /// Snowfall from the resort's first terrain row, `0.0` when none.
    pub snow_24hr: f64,
    /// Tracked terrain in store order.
    pub terrain: Vec<TerrainStatusDto>,
}

impl ResortStatusDto {
    /// Builds the board from daily-view rows.
    #[must_use]
    pub fn from_rows(rows: &[TerrainDay]) -> Self {
        Self {
            snow_24hr: rows.first().map_or(0.0, |row| row.snowfall_24hr),
            terrain: rows
                .iter()
                .map(|row| TerrainStatusDto {
                    name: row.terrain_name.clone(),
                    ever_opened: row.ever_opened,
                    closed_streak: row.closed_streak,
                })
                .collect(),
        }
    }
}

/// One terrain line on a resort board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TerrainStatusDto {
    /// Terrain name.
    pub name: String,
    /// Opened at any point that day.
    pub ever_opened: bool,
    /// Consecutive closed days ending at the requested date.
    pub closed_streak: u32,
}

/// Response body for `GET /api/open-times`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OpenTimesResponse {
    /// Requested date.
    #[schema(value_type = String)]
    pub date: NaiveDate,
    /// `"resort|terrain"` to earliest open observation.
    #[schema(value_type = Object)]
    pub first_open: BTreeMap<String, DateTime<FixedOffset>>,
}

/// Query parameters for `GET /api/snow-report`. Both are required.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SnowReportParams {
    /// Resort identifier, e.g. `snowbird`.
    #[serde(default)]
    pub resort: Option<String>,
    /// Calendar date as `YYYY-MM-DD`.
    #[serde(default)]
    pub date: Option<String>,
}

/// Response body for `GET /api/snow-report`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SnowReportResponse {
    /// Resort as requested.
    pub resort: String,
    /// Requested date.
    #[schema(value_type = String)]
    pub date: NaiveDate,
    /// Stored narrative, `null` when none was captured.
    pub report_text: Option<String>,
}
