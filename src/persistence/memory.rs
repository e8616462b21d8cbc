//! In-process store with per-key locking.
//!
//! Daily rows live in a `RwLock<HashMap<...>>` whose entries are each behind
//! their own `Arc<RwLock<...>>`, so merges of different keys proceed
//! concurrently and merges of one key are serialized.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use tokio::sync::RwLock;

use super::TerrainStore;
use crate::domain::{
    DailyObservation, DailySummary, Resort, SnowReport, TerrainKey, TerrainSnapshot, TerrainStatus,
};
use crate::error::TrackerError;

type DailyKey = (TerrainKey, NaiveDate);

#[derive(Debug)]
struct DailyEntry {
    /// Insertion order, used to break date ties.
    seq: u64,
    row: DailySummary,
}

/// Non-durable [`TerrainStore`], used when persistence is disabled and in
/// tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshots: RwLock<Vec<TerrainSnapshot>>,
    daily: RwLock<HashMap<DailyKey, Arc<RwLock<DailyEntry>>>>,
    next_seq: AtomicU64,
    reports: RwLock<HashMap<(Resort, NaiveDate), SnowReport>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of snapshots appended so far.
    pub async fn snapshot_count(&self) -> usize {
        self.snapshots.read().await.len()
    }

    async fn collect_rows<F>(&self, mut keep: F) -> Vec<(u64, DailySummary)>
    where
        F: FnMut(&DailyKey) -> bool + Send,
    {
        let map = self.daily.read().await;
        let mut rows = Vec::with_capacity(map.len());
        for (key, entry_lock) in map.iter() {
            if !keep(key) {
                continue;
            }
            let entry = entry_lock.read().await;
            rows.push((entry.seq, entry.row.clone()));
        }
        rows
    }
}

fn sorted(mut rows: Vec<(u64, DailySummary)>) -> Vec<DailySummary> {
    rows.sort_by(|(a_seq, a), (b_seq, b)| a.date.cmp(&b.date).then(a_seq.cmp(b_seq)));
    rows.into_iter().map(|(_, row)| row).collect()
}

#[async_trait]
impl TerrainStore for MemoryStore {
    async fn append_snapshot(&self, snapshot: &TerrainSnapshot) -> Result<(), TrackerError> {
        self.snapshots.write().await.push(snapshot.clone());
        Ok(())
    }

    async fn first_open_time(
        &self,
        key: &TerrainKey,
        date: NaiveDate,
    ) -> Result<Option<DateTime<FixedOffset>>, TrackerError> {
        let log = self.snapshots.read().await;
        Ok(log
            .iter()
            .filter(|s| s.status == TerrainStatus::Open && s.date() == date && s.key == *key)
            .map(|s| s.observed_at)
            .min())
    }

    async fn open_times(
        &self,
        date: NaiveDate,
    ) -> Result<BTreeMap<String, DateTime<FixedOffset>>, TrackerError> {
        let log = self.snapshots.read().await;
        let mut times = BTreeMap::new();
        for snapshot in log
            .iter()
            .filter(|s| s.status == TerrainStatus::Open && s.date() == date)
        {
            times
                .entry(snapshot.key.to_string())
                .and_modify(|first: &mut DateTime<FixedOffset>| {
                    if snapshot.observed_at < *first {
                        *first = snapshot.observed_at;
                    }
                })
                .or_insert(snapshot.observed_at);
        }
        Ok(times)
    }

    async fn merge_daily(&self, obs: &DailyObservation) -> Result<DailySummary, TrackerError> {
        let key = (obs.key.clone(), obs.date);
        let existing = self.daily.read().await.get(&key).map(Arc::clone);
        let entry_lock = match existing {
            Some(entry_lock) => entry_lock,
            None => {
                let mut map = self.daily.write().await;
                match map.entry(key) {
                    Entry::Occupied(occupied) => Arc::clone(occupied.get()),
                    Entry::Vacant(vacant) => {
                        let row = DailySummary::first(obs);
                        vacant.insert(Arc::new(RwLock::new(DailyEntry {
                            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                            row: row.clone(),
                        })));
                        return Ok(row);
                    }
                }
            }
        };
        let mut entry = entry_lock.write().await;
        entry.row.absorb(obs);
        Ok(entry.row.clone())
    }

    async fn daily_rows_on(&self, date: NaiveDate) -> Result<Vec<DailySummary>, TrackerError> {
        Ok(sorted(self.collect_rows(|(_, d)| *d == date).await))
    }

    async fn daily_rows(&self) -> Result<Vec<DailySummary>, TrackerError> {
        Ok(sorted(self.collect_rows(|_| true).await))
    }

    async fn save_snow_report(&self, report: &SnowReport) -> Result<bool, TrackerError> {
        let mut reports = self.reports.write().await;
        match reports.entry((report.resort, report.date)) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(vacant) => {
                vacant.insert(report.clone());
                Ok(true)
            }
        }
    }

    async fn snow_report(
        &self,
        resort: Resort,
        date: NaiveDate,
    ) -> Result<Option<SnowReport>, TrackerError> {
        Ok(self.reports.read().await.get(&(resort, date)).cloned())
    }
}
