//! DTOs for the longitudinal history endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::service::history::{SnowCalendar, TerrainCalendar};

/// Query parameters for `GET /api/terrain-calendar`. Both are required.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TerrainCalendarParams {
    /// Resort identifier.
    #[serde(default)]
    pub resort: Option<String>,
    /// Terrain name as listed by the resort.
    #[serde(default)]
    pub terrain: Option<String>,
}

/// Response body for `GET /api/terrain-calendar`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TerrainCalendarResponse {
    /// Resort as requested.
    pub resort: String,
    /// Terrain as requested.
    pub terrain: String,
    /// Date to `ever_opened`, ascending.
    #[schema(value_type = Object)]
    pub days: TerrainCalendar,
}

/// Query parameters for `GET /api/snow-calendar`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SnowCalendarParams {
    /// Resort identifier. Required.
    #[serde(default)]
    pub resort: Option<String>,
}

/// Response body for `GET /api/snow-calendar`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SnowCalendarResponse {
    /// Resort as requested.
    pub resort: String,
    /// Date to 24-hour snowfall, ascending.
    #[schema(value_type = Object)]
    pub days: SnowCalendar,
}
