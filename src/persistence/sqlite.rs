//! SQLite implementation of [`TerrainStore`].
//!
//! Dates are stored as `YYYY-MM-DD` text and timestamps as RFC 3339 text.
//! The daily merge is one `INSERT ... ON CONFLICT DO UPDATE` statement, so
//! concurrent merges of a key are serialized by SQLite itself.

use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use super::TerrainStore;
use crate::domain::{
    DailyObservation, DailySummary, Resort, SnowReport, TerrainKey, TerrainSnapshot, TerrainStatus,
};
use crate::error::TrackerError;

const DATE_FORMAT: &str = "%Y-%m-%d";

const DAILY_COLUMNS: &str = "resort, terrain_name, date, ever_opened, snowfall_24hr";

type DailyRow = (String, String, String, bool, f64);

/// `sqlx` SQLite-backed store.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if missing) the database at `url` and ensures the
    /// schema exists.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Persistence`] if the URL is invalid or the
    /// database cannot be opened or initialised.
    pub async fn open(url: &str, max_connections: u32) -> Result<Self, TrackerError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        if let Some(parent) = options.get_filename().parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                TrackerError::Persistence(format!(
                    "failed to create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.init_schema().await?;
        tracing::info!(url, "sqlite store opened");
        Ok(store)
    }

    /// Creates a private in-memory database.
    ///
    /// The pool holds exactly one connection that never expires, because
    /// every SQLite in-memory connection is a separate database.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Persistence`] if the schema cannot be created.
    pub async fn in_memory() -> Result<Self, TrackerError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), TrackerError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS terrain_snapshots (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                resort TEXT NOT NULL,
                terrain_name TEXT NOT NULL,
                status TEXT NOT NULL,
                date TEXT NOT NULL,
                scraped_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_snapshots_date_status \
             ON terrain_snapshots (date, status)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS daily_summary (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                resort TEXT NOT NULL,
                terrain_name TEXT NOT NULL,
                date TEXT NOT NULL,
                ever_opened INTEGER NOT NULL DEFAULT 0,
                snowfall_24hr REAL NOT NULL DEFAULT 0.0,
                UNIQUE (resort, terrain_name, date)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS snow_reports (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                resort TEXT NOT NULL,
                date TEXT NOT NULL,
                report_text TEXT NOT NULL,
                fetched_at TEXT NOT NULL,
                UNIQUE (resort, date)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn fetch_daily(
        &self,
        filter: &str,
        binds: &[String],
    ) -> Result<Vec<DailySummary>, TrackerError> {
        let sql = format!(
            "SELECT {DAILY_COLUMNS} FROM daily_summary {filter} ORDER BY date ASC, id ASC"
        );
        let mut query = sqlx::query_as::<_, DailyRow>(&sql);
        for value in binds {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(summary_from_row).collect()
    }
}

fn corrupt(what: &str, raw: &str, err: impl std::fmt::Display) -> TrackerError {
    TrackerError::Persistence(format!("stored {what} {raw:?} is unreadable: {err}"))
}

fn parse_date(raw: &str) -> Result<NaiveDate, TrackerError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| corrupt("date", raw, e))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, TrackerError> {
    DateTime::parse_from_rfc3339(raw).map_err(|e| corrupt("timestamp", raw, e))
}

fn parse_resort(raw: &str) -> Result<Resort, TrackerError> {
    raw.parse().map_err(|e| corrupt("resort", raw, e))
}

fn summary_from_row(
    (resort, terrain_name, date, ever_opened, snowfall_24hr): DailyRow,
) -> Result<DailySummary, TrackerError> {
    Ok(DailySummary {
        resort: parse_resort(&resort)?,
        terrain_name,
        date: parse_date(&date)?,
        ever_opened,
        snowfall_24hr,
    })
}

#[async_trait]
impl TerrainStore for SqliteStore {
    async fn append_snapshot(&self, snapshot: &TerrainSnapshot) -> Result<(), TrackerError> {
        sqlx::query(
            "INSERT INTO terrain_snapshots (resort, terrain_name, status, date, scraped_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(snapshot.key.resort().as_str())
        .bind(snapshot.key.terrain())
        .bind(snapshot.status.as_str())
        .bind(snapshot.date().format(DATE_FORMAT).to_string())
        .bind(snapshot.observed_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn first_open_time(
        &self,
        key: &TerrainKey,
        date: NaiveDate,
    ) -> Result<Option<DateTime<FixedOffset>>, TrackerError> {
        let raw = sqlx::query_scalar::<_, String>(
            "SELECT scraped_at FROM terrain_snapshots \
             WHERE resort = ? AND terrain_name = ? AND date = ? AND status = ?",
        )
        .bind(key.resort().as_str())
        .bind(key.terrain())
        .bind(date.format(DATE_FORMAT).to_string())
        .bind(TerrainStatus::Open.as_str())
        .fetch_all(&self.pool)
        .await?;

        let mut first: Option<DateTime<FixedOffset>> = None;
        for ts in raw.iter().map(|s| parse_timestamp(s)) {
            let ts = ts?;
            if first.is_none_or(|f| ts < f) {
                first = Some(ts);
            }
        }
        Ok(first)
    }

    async fn open_times(
        &self,
        date: NaiveDate,
    ) -> Result<BTreeMap<String, DateTime<FixedOffset>>, TrackerError> {
        let rows = sqlx::query_as::<_, (String, String, String)>(
            "SELECT resort, terrain_name, scraped_at FROM terrain_snapshots \
             WHERE date = ? AND status = ?",
        )
        .bind(date.format(DATE_FORMAT).to_string())
        .bind(TerrainStatus::Open.as_str())
        .fetch_all(&self.pool)
        .await?;

        let mut times = BTreeMap::new();
        for (resort, terrain_name, scraped_at) in rows {
            let ts = parse_timestamp(&scraped_at)?;
            times
                .entry(format!("{resort}|{terrain_name}"))
                .and_modify(|first: &mut DateTime<FixedOffset>| {
                    if ts < *first {
                        *first = ts;
                    }
                })
                .or_insert(ts);
        }
        Ok(times)
    }

    async fn merge_daily(&self, obs: &DailyObservation) -> Result<DailySummary, TrackerError> {
        let (ever_opened, snowfall_24hr) = sqlx::query_as::<_, (bool, f64)>(
            r"
            INSERT INTO daily_summary (resort, terrain_name, date, ever_opened, snowfall_24hr)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (resort, terrain_name, date) DO UPDATE SET
                ever_opened = MAX(daily_summary.ever_opened, excluded.ever_opened),
                snowfall_24hr = excluded.snowfall_24hr
            RETURNING ever_opened, snowfall_24hr
            ",
        )
        .bind(obs.key.resort().as_str())
        .bind(obs.key.terrain())
        .bind(obs.date.format(DATE_FORMAT).to_string())
        .bind(obs.status.is_open())
        .bind(obs.snowfall_24hr)
        .fetch_one(&self.pool)
        .await?;

        Ok(DailySummary {
            resort: obs.key.resort(),
            terrain_name: obs.key.terrain().to_string(),
            date: obs.date,
            ever_opened,
            snowfall_24hr,
        })
    }

    async fn daily_rows_on(&self, date: NaiveDate) -> Result<Vec<DailySummary>, TrackerError> {
        self.fetch_daily("WHERE date = ?", &[date.format(DATE_FORMAT).to_string()])
            .await
    }

    async fn daily_rows(&self) -> Result<Vec<DailySummary>, TrackerError> {
        self.fetch_daily("", &[]).await
    }

    async fn terrain_rows(&self, key: &TerrainKey) -> Result<Vec<DailySummary>, TrackerError> {
        self.fetch_daily(
            "WHERE resort = ? AND terrain_name = ?",
            &[key.resort().to_string(), key.terrain().to_string()],
        )
        .await
    }

    async fn resort_rows(&self, resort: Resort) -> Result<Vec<DailySummary>, TrackerError> {
        self.fetch_daily("WHERE resort = ?", &[resort.to_string()])
            .await
    }

    async fn save_snow_report(&self, report: &SnowReport) -> Result<bool, TrackerError> {
        let result = sqlx::query(
            "INSERT INTO snow_reports (resort, date, report_text, fetched_at) \
             VALUES (?, ?, ?, ?) ON CONFLICT (resort, date) DO NOTHING",
        )
        .bind(report.resort.as_str())
        .bind(report.date.format(DATE_FORMAT).to_string())
        .bind(&report.report_text)
        .bind(report.fetched_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn snow_report(
        &self,
        resort: Resort,
        date: NaiveDate,
    ) -> Result<Option<SnowReport>, TrackerError> {
        let row = sqlx::query_as::<_, (String, String)>(
            "SELECT report_text, fetched_at FROM snow_reports WHERE resort = ? AND date = ?",
        )
        .bind(resort.as_str())
        .bind(date.format(DATE_FORMAT).to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(report_text, fetched_at)| {
            Ok(SnowReport {
                resort,
                date,
                report_text,
                fetched_at: parse_timestamp(&fetched_at)?,
            })
        })
        .transpose()
    }
}
