//! Persistence layer: snapshot log, daily aggregates and snow reports.
//!
//! [`TerrainStore`] is the storage contract. Two implementations exist:
//! [`MemoryStore`] keeps everything in process behind per-key locks, and
//! [`SqliteStore`] persists to SQLite through `sqlx`, relying on a single
//! upsert statement for merge atomicity.
//!
//! Both honour the same rules:
//! - snapshots are append-only;
//! - a daily merge ORs `ever_opened` and overwrites `snowfall_24hr`, and
//!   concurrent merges of one key behave as if applied in some order;
//! - the first stored snow report for a resort and date is kept;
//! - rows come back in ascending date order, ties in insertion order.

pub mod memory;
pub mod sqlite;

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::domain::{DailyObservation, DailySummary, Resort, SnowReport, TerrainKey, TerrainSnapshot};
use crate::error::TrackerError;

/// Storage contract for the scrape cycle and the query service.
#[async_trait]
pub trait TerrainStore: Send + Sync + fmt::Debug {
    /// Appends one observation to the snapshot log.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Persistence`] on storage failure.
    async fn append_snapshot(&self, snapshot: &TerrainSnapshot) -> Result<(), TrackerError>;

    /// Earliest open observation of `key` on `date`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Persistence`] on storage failure.
    async fn first_open_time(
        &self,
        key: &TerrainKey,
        date: NaiveDate,
    ) -> Result<Option<DateTime<FixedOffset>>, TrackerError>;

    /// Earliest open observation on `date` for every terrain that opened,
    /// keyed by `"resort|terrain"`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Persistence`] on storage failure.
    async fn open_times(
        &self,
        date: NaiveDate,
    ) -> Result<BTreeMap<String, DateTime<FixedOffset>>, TrackerError>;

    /// Folds one observation into its daily row and returns the result.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Persistence`] on storage failure.
    async fn merge_daily(&self, obs: &DailyObservation) -> Result<DailySummary, TrackerError>;

    /// Every daily row for `date`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Persistence`] on storage failure.
    async fn daily_rows_on(&self, date: NaiveDate) -> Result<Vec<DailySummary>, TrackerError>;

    /// Every daily row, ascending by date, ties in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Persistence`] on storage failure.
    async fn daily_rows(&self) -> Result<Vec<DailySummary>, TrackerError>;

    /// Daily rows of one terrain, ascending by date.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Persistence`] on storage failure.
    async fn terrain_rows(&self, key: &TerrainKey) -> Result<Vec<DailySummary>, TrackerError> {
        Ok(self
            .daily_rows()
            .await?
            .into_iter()
            .filter(|row| row.resort == key.resort() && row.terrain_name == key.terrain())
            .collect())
    }

    /// Daily rows of one resort, ascending by date, ties in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Persistence`] on storage failure.
    async fn resort_rows(&self, resort: Resort) -> Result<Vec<DailySummary>, TrackerError> {
        Ok(self
            .daily_rows()
            .await?
            .into_iter()
            .filter(|row| row.resort == resort)
            .collect())
    }

    /// Stores the day's report unless one already exists. Returns `true`
    /// when the report was stored.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Persistence`] on storage failure.
    async fn save_snow_report(&self, report: &SnowReport) -> Result<bool, TrackerError>;

    /// The stored report for `resort` on `date`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Persistence`] on storage failure.
    async fn snow_report(
        &self,
        resort: Resort,
        date: NaiveDate,
    ) -> Result<Option<SnowReport>, TrackerError>;
}
