//! One scrape/aggregate cycle.
//!
//! A cycle fans out over every adapter concurrently. Each adapter gets its
//! own time budget covering fetch and parse; failure or expiry yields an
//! empty report, so one resort can never abort the batch. As soon as a
//! resort finishes, its readings are validated, appended to the snapshot
//! log and merged into the daily rows. Only one cycle runs at a time.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use futures_util::future::join_all;
use tokio::sync::Mutex;
use tracing::Instrument;

use crate::domain::{
    CycleId, DailyObservation, DailySummary, RawTerrainReport, Resort, SnowReport, TerrainKey,
    TerrainReading, TerrainSnapshot,
};
use crate::error::TrackerError;
use crate::persistence::TerrainStore;
use crate::scrape::{PageFetcher, ResortAdapter, fetch_pages};

/// Default per-adapter budget.
pub const DEFAULT_ADAPTER_TIMEOUT: Duration = Duration::from_secs(60);

/// What a cycle did for one resort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResortOutcome {
    /// Resort covered.
    pub resort: Resort,
    /// Readings the adapter produced; zero for a failed adapter.
    pub readings: usize,
    /// Readings merged into daily rows.
    pub merged: usize,
    /// Readings rejected as contract violations or storage failures.
    pub rejected: usize,
    /// Whether this cycle stored the day's snow report.
    pub report_saved: bool,
}

impl ResortOutcome {
    fn new(resort: Resort) -> Self {
        Self {
            resort,
            readings: 0,
            merged: 0,
            rejected: 0,
            report_saved: false,
        }
    }

    /// `true` when the adapter produced nothing (failure or timeout).
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        self.readings == 0
    }
}

/// Summary of a completed cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Correlation id carried by the cycle's log lines.
    pub cycle_id: CycleId,
    /// Calendar date every observation of the cycle was filed under.
    pub date: NaiveDate,
    /// One entry per adapter, in adapter order.
    pub resorts: Vec<ResortOutcome>,
}

impl CycleReport {
    /// Total readings merged across resorts.
    #[must_use]
    pub fn merged(&self) -> usize {
        self.resorts.iter().map(|r| r.merged).sum()
    }

    /// Outcome for one resort, if it had an adapter.
    #[must_use]
    pub fn resort(&self, resort: Resort) -> Option<&ResortOutcome> {
        self.resorts.iter().find(|r| r.resort == resort)
    }
}

/// Result of asking for a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Another cycle was still running; nothing was done.
    Skipped,
    /// The cycle ran to completion.
    Completed(CycleReport),
}

/// Drives scrape cycles over a fixed adapter set.
#[derive(Debug)]
pub struct ScrapeCycle {
    store: Arc<dyn TerrainStore>,
    fetcher: Arc<dyn PageFetcher>,
    adapters: Vec<Arc<dyn ResortAdapter>>,
    adapter_timeout: Duration,
    offset: FixedOffset,
    in_flight: Mutex<()>,
}

impl ScrapeCycle {
    /// Creates a cycle driver with the default timeout, filing dates in UTC.
    #[must_use]
    pub fn new(
        store: Arc<dyn TerrainStore>,
        fetcher: Arc<dyn PageFetcher>,
        adapters: Vec<Arc<dyn ResortAdapter>>,
    ) -> Self {
        Self {
            store,
            fetcher,
            adapters,
            adapter_timeout: DEFAULT_ADAPTER_TIMEOUT,
            offset: Utc.fix(),
            in_flight: Mutex::new(()),
        }
    }

    /// Sets the per-adapter budget for fetch plus parse.
    #[must_use]
    pub fn with_adapter_timeout(mut self, timeout: Duration) -> Self {
        self.adapter_timeout = timeout;
        self
    }

    /// Sets the offset whose local calendar date observations are filed
    /// under.
    #[must_use]
    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Returns the configured offset.
    #[must_use]
    pub const fn utc_offset(&self) -> FixedOffset {
        self.offset
    }

    /// Runs one cycle stamped with the current time.
    pub async fn run(&self) -> CycleOutcome {
        self.run_at(Utc::now().with_timezone(&self.offset)).await
    }

    /// Runs one cycle with every observation stamped `now`.
    ///
    /// Returns [`CycleOutcome::Skipped`] without doing anything if another
    /// cycle is still in flight.
    pub async fn run_at(&self, now: DateTime<FixedOffset>) -> CycleOutcome {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::info!("previous scrape cycle still running, skipping");
            return CycleOutcome::Skipped;
        };
        let cycle_id = CycleId::new();
        let span = tracing::info_span!("scrape_cycle", cycle_id = %cycle_id);
        async move {
            tracing::info!(adapters = self.adapters.len(), %now, "scrape cycle started");
            let resorts =
                join_all(self.adapters.iter().map(|adapter| self.run_adapter(adapter, now))).await;
            let report = CycleReport {
                cycle_id,
                date: now.date_naive(),
                resorts,
            };
            tracing::info!(
                merged = report.merged(),
                failed = report.resorts.iter().filter(|r| r.is_failed()).count(),
                "scrape cycle complete"
            );
            CycleOutcome::Completed(report)
        }
        .instrument(span)
        .await
    }

    async fn run_adapter(
        &self,
        adapter: &Arc<dyn ResortAdapter>,
        now: DateTime<FixedOffset>,
    ) -> ResortOutcome {
        let resort = adapter.resort();
        let report = match tokio::time::timeout(self.adapter_timeout, self.scrape(adapter)).await
        {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => {
                tracing::warn!(%resort, error = %e, "adapter failed");
                RawTerrainReport::empty()
            }
            Err(_) => {
                let e = TrackerError::Timeout {
                    resort: resort.to_string(),
                    secs: self.adapter_timeout.as_secs(),
                };
                tracing::warn!(%resort, error = %e, "adapter timed out");
                RawTerrainReport::empty()
            }
        };
        self.ingest(resort, &report, now).await
    }

    async fn scrape(
        &self,
        adapter: &Arc<dyn ResortAdapter>,
    ) -> Result<RawTerrainReport, TrackerError> {
        let resort = adapter.resort();
        let page = fetch_pages(self.fetcher.as_ref(), &adapter.urls()).await?;
        let adapter = Arc::clone(adapter);
        // Parsing is CPU-bound and a panic in it must stay inside this resort.
        tokio::task::spawn_blocking(move || adapter.scrape(&page))
            .await
            .map_err(|e| TrackerError::Scrape {
                resort: resort.to_string(),
                message: e.to_string(),
            })
    }

    async fn ingest(
        &self,
        resort: Resort,
        report: &RawTerrainReport,
        now: DateTime<FixedOffset>,
    ) -> ResortOutcome {
        let mut outcome = ResortOutcome::new(resort);
        outcome.readings = report.terrain.len();
        for reading in &report.terrain {
            match self.record(resort, reading, report.snow_24hr, now).await {
                Ok(row) => {
                    outcome.merged += 1;
                    tracing::debug!(
                        %resort,
                        terrain = %reading.name,
                        status = %reading.status,
                        ever_opened = row.ever_opened,
                        "terrain merged"
                    );
                }
                Err(e) => {
                    outcome.rejected += 1;
                    tracing::error!(%resort, terrain = %reading.name, error = %e, "observation rejected");
                }
            }
        }

        if SnowReport::is_substantive(&report.report_text) {
            let snow_report = SnowReport {
                resort,
                date: now.date_naive(),
                report_text: report.report_text.clone(),
                fetched_at: now,
            };
            match self.store.save_snow_report(&snow_report).await {
                Ok(saved) => outcome.report_saved = saved,
                Err(e) => tracing::error!(%resort, error = %e, "snow report not saved"),
            }
        }

        tracing::info!(
            %resort,
            readings = outcome.readings,
            merged = outcome.merged,
            snow_24hr = report.snow_24hr,
            "resort ingested"
        );
        outcome
    }

    async fn record(
        &self,
        resort: Resort,
        reading: &TerrainReading,
        snow_24hr: f64,
        now: DateTime<FixedOffset>,
    ) -> Result<DailySummary, TrackerError> {
        let key = TerrainKey::new(resort, &reading.name)?;
        let obs = DailyObservation::new(key.clone(), now.date_naive(), reading.status, snow_24hr)?;
        self.store
            .append_snapshot(&TerrainSnapshot::new(key, reading.status, now))
            .await?;
        self.store.merge_daily(&obs).await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use chrono::TimeZone;
    use tokio::sync::Notify;

    use super::*;
    use crate::domain::TerrainStatus;
    use crate::persistence::MemoryStore;
    use crate::scrape::{PageSource, PageUrls};

    #[derive(Debug)]
    struct StubAdapter {
        resort: Resort,
        url: &'static str,
        readings: Vec<(&'static str, TerrainStatus)>,
        snow: f64,
        report: &'static str,
    }

    impl StubAdapter {
        fn new(resort: Resort, url: &'static str, readings: Vec<(&'static str, TerrainStatus)>) -> Self {
            Self {
                resort,
                url,
                readings,
                snow: 0.0,
                report: "",
            }
        }
    }

    impl ResortAdapter for StubAdapter {
        fn resort(&self) -> Resort {
            self.resort
        }

        fn urls(&self) -> PageUrls {
            PageUrls::single(self.url)
        }

        fn scrape(&self, _page: &PageSource) -> RawTerrainReport {
            RawTerrainReport {
                snow_24hr: self.snow,
                report_text: self.report.to_string(),
                terrain: self
                    .readings
                    .iter()
                    .map(|(name, status)| TerrainReading {
                        name: (*name).to_string(),
                        status: *status,
                    })
                    .collect(),
            }
        }
    }

    /// Serves known URLs; `slow` URLs sleep first, `gated` URLs wait for a
    /// notification.
    #[derive(Debug, Default)]
    struct StubFetcher {
        known: Vec<&'static str>,
        slow: HashMap<&'static str, Duration>,
        gate: Option<(Arc<Notify>, Arc<Notify>)>,
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<String, TrackerError> {
            if let Some(delay) = self.slow.get(url) {
                tokio::time::sleep(*delay).await;
            }
            if let Some((entered, release)) = &self.gate {
                entered.notify_one();
                release.notified().await;
            }
            if self.known.iter().any(|known| *known == url) {
                Ok("<html></html>".to_string())
            } else {
                Err(TrackerError::Fetch(format!("connection refused: {url}")))
            }
        }
    }

    fn noon() -> DateTime<FixedOffset> {
        let Some(offset) = FixedOffset::west_opt(7 * 3600) else {
            panic!("valid offset");
        };
        let Some(ts) = offset.with_ymd_and_hms(2025, 1, 20, 12, 0, 0).single() else {
            panic!("valid timestamp");
        };
        ts
    }

    fn shared(store: &Arc<MemoryStore>) -> Arc<dyn TerrainStore> {
        let handle: Arc<MemoryStore> = Arc::clone(store);
        handle
    }

    fn completed(outcome: CycleOutcome) -> CycleReport {
        let CycleOutcome::Completed(report) = outcome else {
            panic!("cycle should complete");
        };
        report
    }

    #[tokio::test]
    async fn failed_adapter_does_not_block_others() {
        let store = Arc::new(MemoryStore::new());
        let fetcher = StubFetcher {
            known: vec!["b"],
            ..StubFetcher::default()
        };
        let adapters: Vec<Arc<dyn ResortAdapter>> = vec![
            Arc::new(StubAdapter::new(
                Resort::Snowbird,
                "down",
                vec![("High Baldy", TerrainStatus::Open)],
            )),
            Arc::new(StubAdapter::new(
                Resort::Brighton,
                "b",
                vec![("Milly Bowl", TerrainStatus::Open), ("Snake Bowl", TerrainStatus::Closed)],
            )),
        ];
        let cycle = ScrapeCycle::new(shared(&store), Arc::new(fetcher), adapters);
        let report = completed(cycle.run_at(noon()).await);

        assert_eq!(report.merged(), 2);
        assert!(report.resort(Resort::Snowbird).is_some_and(ResortOutcome::is_failed));
        let Ok(rows) = store.daily_rows().await else {
            panic!("rows readable");
        };
        assert!(rows.iter().all(|r| r.resort == Resort::Brighton));
        assert_eq!(store.snapshot_count().await, 2);
    }

    #[tokio::test]
    async fn slow_adapter_times_out_and_others_finish() {
        let store = Arc::new(MemoryStore::new());
        let fetcher = StubFetcher {
            known: vec!["slow", "fast"],
            slow: HashMap::from([("slow", Duration::from_secs(30))]),
            gate: None,
        };
        let adapters: Vec<Arc<dyn ResortAdapter>> = vec![
            Arc::new(StubAdapter::new(
                Resort::Solitude,
                "slow",
                vec![("Summit Express", TerrainStatus::Open)],
            )),
            Arc::new(StubAdapter::new(
                Resort::Snowbasin,
                "fast",
                vec![("Allen Peak Tram", TerrainStatus::Pending)],
            )),
        ];
        let cycle = ScrapeCycle::new(shared(&store), Arc::new(fetcher), adapters)
            .with_adapter_timeout(Duration::from_millis(50));
        let report = completed(cycle.run_at(noon()).await);

        assert!(report.resort(Resort::Solitude).is_some_and(ResortOutcome::is_failed));
        assert_eq!(report.resort(Resort::Snowbasin).map(|r| r.merged), Some(1));
    }

    #[tokio::test]
    async fn failed_resort_keeps_prior_rows() {
        let store = Arc::new(MemoryStore::new());
        let adapter: Arc<dyn ResortAdapter> = Arc::new(StubAdapter::new(
            Resort::Brighton,
            "b",
            vec![("Milly Bowl", TerrainStatus::Open)],
        ));
        let up = ScrapeCycle::new(
            shared(&store),
            Arc::new(StubFetcher {
                known: vec!["b"],
                ..StubFetcher::default()
            }),
            vec![Arc::clone(&adapter)],
        );
        completed(up.run_at(noon()).await);

        let down = ScrapeCycle::new(
            shared(&store),
            Arc::new(StubFetcher::default()),
            vec![adapter],
        );
        completed(down.run_at(noon()).await);

        let Ok(rows) = store.daily_rows().await else {
            panic!("rows readable");
        };
        assert_eq!(rows.len(), 1);
        assert!(rows.iter().all(|r| r.ever_opened));
    }

    #[tokio::test]
    async fn untracked_reading_is_rejected_alone() {
        let store = Arc::new(MemoryStore::new());
        let adapter = StubAdapter::new(
            Resort::Snowbird,
            "s",
            vec![("Mineral Basin", TerrainStatus::Open), ("Gad 2", TerrainStatus::Open)],
        );
        let cycle = ScrapeCycle::new(
            shared(&store),
            Arc::new(StubFetcher {
                known: vec!["s"],
                ..StubFetcher::default()
            }),
            vec![Arc::new(adapter)],
        );
        let report = completed(cycle.run_at(noon()).await);
        let Some(snowbird) = report.resort(Resort::Snowbird) else {
            panic!("snowbird outcome present");
        };
        assert_eq!((snowbird.merged, snowbird.rejected), (1, 1));
        assert_eq!(store.snapshot_count().await, 1);
    }

    #[tokio::test]
    async fn substantive_report_saved_once_per_day() {
        let store = Arc::new(MemoryStore::new());
        let mut adapter = StubAdapter::new(Resort::Snowbird, "s", vec![]);
        adapter.snow = 8.0;
        adapter.report = "Eight inches overnight; Mineral Basin on wind hold until further notice.";
        let cycle = ScrapeCycle::new(
            shared(&store),
            Arc::new(StubFetcher {
                known: vec!["s"],
                ..StubFetcher::default()
            }),
            vec![Arc::new(adapter)],
        );
        let first = completed(cycle.run_at(noon()).await);
        let second = completed(cycle.run_at(noon()).await);
        assert!(first.resort(Resort::Snowbird).is_some_and(|r| r.report_saved));
        assert!(second.resort(Resort::Snowbird).is_some_and(|r| !r.report_saved));
        let Ok(Some(stored)) = store.snow_report(Resort::Snowbird, noon().date_naive()).await else {
            panic!("report stored");
        };
        assert!(stored.report_text.starts_with("Eight inches"));
    }

    #[tokio::test]
    async fn overlapping_cycle_is_skipped() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let fetcher = StubFetcher {
            known: vec!["b"],
            gate: Some((Arc::clone(&entered), Arc::clone(&release))),
            ..StubFetcher::default()
        };
        let adapters: Vec<Arc<dyn ResortAdapter>> = vec![Arc::new(StubAdapter::new(
            Resort::Brighton,
            "b",
            vec![("Snake Bowl", TerrainStatus::Closed)],
        ))];
        let cycle = Arc::new(ScrapeCycle::new(
            Arc::new(MemoryStore::new()),
            Arc::new(fetcher),
            adapters,
        ));

        let running = {
            let cycle = Arc::clone(&cycle);
            tokio::spawn(async move { cycle.run_at(noon()).await })
        };
        entered.notified().await;
        assert_eq!(cycle.run_at(noon()).await, CycleOutcome::Skipped);

        release.notify_one();
        let Ok(outcome) = running.await else {
            panic!("first cycle finishes");
        };
        assert_eq!(completed(outcome).merged(), 1);
    }

    #[tokio::test]
    async fn observations_are_filed_under_local_date() {
        let store = Arc::new(MemoryStore::new());
        let cycle = ScrapeCycle::new(
            shared(&store),
            Arc::new(StubFetcher {
                known: vec!["b"],
                ..StubFetcher::default()
            }),
            vec![Arc::new(StubAdapter::new(
                Resort::Brighton,
                "b",
                vec![("Milly Bowl", TerrainStatus::Closed)],
            ))],
        );
        // 21:30 at UTC-7 is already the next day in UTC.
        let Some(late) = noon().checked_add_signed(chrono::Duration::minutes(570)) else {
            panic!("valid timestamp");
        };
        let report = completed(cycle.run_at(late).await);
        assert_eq!(report.date, noon().date_naive());
    }
}
