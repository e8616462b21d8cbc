//! Observation and aggregate records.
//!
//! - [`RawTerrainReport`]: what an adapter returns for one resort.
//! - [`TerrainSnapshot`]: one immutable, timestamped observation (append-only).
//! - [`DailyObservation`]: the input of a daily merge.
//! - [`DailySummary`]: the per-`(resort, terrain, date)` fold of a day's
//!   observations.
//! - [`SnowReport`]: the day's narrative text for a resort (first wins).

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;

use super::{Resort, TerrainKey, TerrainStatus};
use crate::error::TrackerError;

/// Minimum length (in characters) for report text to be worth keeping.
pub const MIN_REPORT_CHARS: usize = 40;

/// Status of one terrain as reported by an adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerrainReading {
    /// Tracked terrain name.
    pub name: String,
    /// Normalized status.
    pub status: TerrainStatus,
}

/// Normalized output of one adapter run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawTerrainReport {
    /// 24-hour snowfall in inches (`0.0` when not found).
    pub snow_24hr: f64,
    /// Narrative conditions text, possibly empty.
    pub report_text: String,
    /// One reading per tracked terrain; empty only for a failed run.
    pub terrain: Vec<TerrainReading>,
}

impl RawTerrainReport {
    /// The neutral report for a failed or timed-out adapter.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            snow_24hr: 0.0,
            report_text: String::new(),
            terrain: Vec::new(),
        }
    }

    /// Returns `true` if the report carries no terrain readings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terrain.is_empty()
    }
}

/// One immutable observation of a terrain's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerrainSnapshot {
    /// Which terrain was observed.
    pub key: TerrainKey,
    /// Observed status.
    pub status: TerrainStatus,
    /// When the observation was made, in the tracker's local offset.
    pub observed_at: DateTime<FixedOffset>,
}

impl TerrainSnapshot {
    /// Creates a snapshot.
    #[must_use]
    pub const fn new(key: TerrainKey, status: TerrainStatus, observed_at: DateTime<FixedOffset>) -> Self {
        Self {
            key,
            status,
            observed_at,
        }
    }

    /// Calendar date of the observation in its own offset.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.observed_at.date_naive()
    }
}

/// Input of one daily merge.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyObservation {
    /// Which terrain was observed.
    pub key: TerrainKey,
    /// Calendar date the observation belongs to.
    pub date: NaiveDate,
    /// Observed status.
    pub status: TerrainStatus,
    /// Resort-level 24-hour snowfall reading at observation time.
    pub snowfall_24hr: f64,
}

impl DailyObservation {
    /// Creates an observation, rejecting unusable snowfall values.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidObservation`] if `snowfall_24hr` is
    /// negative, NaN, or infinite.
    pub fn new(
        key: TerrainKey,
        date: NaiveDate,
        status: TerrainStatus,
        snowfall_24hr: f64,
    ) -> Result<Self, TrackerError> {
        if !snowfall_24hr.is_finite() || snowfall_24hr < 0.0 {
            return Err(TrackerError::InvalidObservation(format!(
                "snowfall for {key} on {date} must be a non-negative number, got {snowfall_24hr}"
            )));
        }
        Ok(Self {
            key,
            date,
            status,
            snowfall_24hr,
        })
    }
}

/// Folded record for one terrain on one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    /// Resort the terrain belongs to.
    pub resort: Resort,
    /// Terrain name.
    pub terrain_name: String,
    /// Calendar date.
    pub date: NaiveDate,
    /// `true` once any observation that day was open; never reverts.
    pub ever_opened: bool,
    /// Snowfall from the most recent observation that day.
    pub snowfall_24hr: f64,
}

impl DailySummary {
    /// Builds the row for the first observation of a key.
    #[must_use]
    pub fn first(obs: &DailyObservation) -> Self {
        Self {
            resort: obs.key.resort(),
            terrain_name: obs.key.terrain().to_string(),
            date: obs.date,
            ever_opened: obs.status.is_open(),
            snowfall_24hr: obs.snowfall_24hr,
        }
    }

    /// Merges a later observation of the same key into this row.
    ///
    /// `ever_opened` is OR-ed (monotonic); `snowfall_24hr` is overwritten.
    pub fn absorb(&mut self, obs: &DailyObservation) {
        self.ever_opened = self.ever_opened || obs.status.is_open();
        self.snowfall_24hr = obs.snowfall_24hr;
    }

    /// Returns the `"resort|terrain"` key string for this row.
    #[must_use]
    pub fn key_string(&self) -> String {
        format!("{}|{}", self.resort, self.terrain_name)
    }
}

/// A resort's narrative snow report for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnowReport {
    /// Resort the report belongs to.
    pub resort: Resort,
    /// Calendar date.
    pub date: NaiveDate,
    /// Report text as scraped.
    pub report_text: String,
    /// When the text was scraped.
    pub fetched_at: DateTime<FixedOffset>,
}

impl SnowReport {
    /// Returns `true` if `text` is long enough to be stored.
    #[must_use]
    pub fn is_substantive(text: &str) -> bool {
        text.trim().chars().count() > MIN_REPORT_CHARS
    }
}
