//! Read-side queries over the store.
//!
//! Resort and terrain arrive as raw strings from the HTTP layer. A name
//! outside the catalogue simply has no data, so it yields an empty result
//! rather than an error.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate};

use super::history::{
    self, DailyView, FullHistory, SnowCalendar, TerrainCalendar, closed_streak, snow_calendar,
    terrain_calendar,
};
use crate::domain::{Resort, SnowReport, TerrainKey};
use crate::error::TrackerError;
use crate::persistence::TerrainStore;

/// Query facade used by the API layer and any other reader.
#[derive(Debug, Clone)]
pub struct QueryService {
    store: Arc<dyn TerrainStore>,
}

fn known_key(resort: &str, terrain: &str) -> Option<TerrainKey> {
    match TerrainKey::parse(resort, terrain) {
        Ok(key) => Some(key),
        Err(e) => {
            tracing::debug!(resort, terrain, error = %e, "query for untracked terrain");
            None
        }
    }
}

fn known_resort(resort: &str) -> Option<Resort> {
    resort.parse().ok()
}

impl QueryService {
    /// Creates a query service over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn TerrainStore>) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn TerrainStore> {
        &self.store
    }

    /// Every resort's terrain on `date`, each with its closed streak.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Persistence`] on storage failure.
    pub async fn daily_view(&self, date: NaiveDate) -> Result<DailyView, TrackerError> {
        if self.store.daily_rows_on(date).await?.is_empty() {
            return Ok(DailyView::new());
        }
        let rows = self.store.daily_rows().await?;
        Ok(history::daily_view(&rows, date))
    }

    /// Consecutive closed days for one terrain ending at `date`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Persistence`] on storage failure.
    pub async fn closed_streak(
        &self,
        resort: &str,
        terrain: &str,
        date: NaiveDate,
    ) -> Result<u32, TrackerError> {
        let calendar = self.terrain_history(resort, terrain).await?;
        Ok(closed_streak(&calendar, date))
    }

    /// The full date × terrain matrix plus per-resort snowfall.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Persistence`] on storage failure.
    pub async fn full_history(&self) -> Result<FullHistory, TrackerError> {
        let rows = self.store.daily_rows().await?;
        Ok(FullHistory::from_rows(&rows))
    }

    /// Snowfall per date for one resort.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Persistence`] on storage failure.
    pub async fn resort_snow_history(&self, resort: &str) -> Result<SnowCalendar, TrackerError> {
        let Some(resort) = known_resort(resort) else {
            return Ok(SnowCalendar::new());
        };
        let rows = self.store.resort_rows(resort).await?;
        Ok(snow_calendar(&rows))
    }

    /// `ever_opened` per date for one terrain.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Persistence`] on storage failure.
    pub async fn terrain_history(
        &self,
        resort: &str,
        terrain: &str,
    ) -> Result<TerrainCalendar, TrackerError> {
        let Some(key) = known_key(resort, terrain) else {
            return Ok(TerrainCalendar::new());
        };
        let rows = self.store.terrain_rows(&key).await?;
        Ok(terrain_calendar(&rows))
    }

    /// Earliest open observation of a terrain on `date`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Persistence`] on storage failure.
    pub async fn first_open_time(
        &self,
        resort: &str,
        terrain: &str,
        date: NaiveDate,
    ) -> Result<Option<DateTime<FixedOffset>>, TrackerError> {
        match known_key(resort, terrain) {
            Some(key) => self.store.first_open_time(&key, date).await,
            None => Ok(None),
        }
    }

    /// Distinct recorded dates, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Persistence`] on storage failure.
    pub async fn dates(&self) -> Result<Vec<NaiveDate>, TrackerError> {
        let mut dates: Vec<NaiveDate> = self
            .store
            .daily_rows()
            .await?
            .into_iter()
            .map(|row| row.date)
            .collect();
        dates.dedup();
        dates.reverse();
        Ok(dates)
    }

    /// First open time of every terrain that opened on `date`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Persistence`] on storage failure.
    pub async fn open_times(
        &self,
        date: NaiveDate,
    ) -> Result<BTreeMap<String, DateTime<FixedOffset>>, TrackerError> {
        self.store.open_times(date).await
    }

    /// Stored narrative report for a resort and date.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Persistence`] on storage failure.
    pub async fn snow_report(
        &self,
        resort: &str,
        date: NaiveDate,
    ) -> Result<Option<SnowReport>, TrackerError> {
        match known_resort(resort) {
            Some(resort) => self.store.snow_report(resort, date).await,
            None => Ok(None),
        }
    }
}
