//! The common adapter capability and its page input.
//!
//! Every resort implements [`ResortAdapter`]: given a [`PageSource`] it
//! returns a [`RawTerrainReport`]. Adapters never fail on bad markup; a
//! page without usable signals degrades to every tracked terrain
//! [`TerrainStatus::Closed`]. Retrieval failures are handled one level up,
//! in the scrape cycle.

use std::fmt;

use crate::domain::{RawTerrainReport, Resort, TerrainReading, TerrainStatus};

/// Pages an adapter needs fetched before it can scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageUrls {
    /// Page carrying lift/terrain status.
    pub terrain: &'static str,
    /// Separate conditions page, when snow and report live elsewhere.
    pub conditions: Option<&'static str>,
}

impl PageUrls {
    /// A resort whose status, snow and report share one page.
    #[must_use]
    pub const fn single(terrain: &'static str) -> Self {
        Self {
            terrain,
            conditions: None,
        }
    }
}

/// Fetched page markup handed to an adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSource {
    terrain: String,
    conditions: Option<String>,
}

impl PageSource {
    /// Wraps the terrain page markup.
    #[must_use]
    pub fn new(terrain: impl Into<String>) -> Self {
        Self {
            terrain: terrain.into(),
            conditions: None,
        }
    }

    /// Attaches a separately fetched conditions page.
    #[must_use]
    pub fn with_conditions(mut self, conditions: impl Into<String>) -> Self {
        self.conditions = Some(conditions.into());
        self
    }

    /// Terrain page markup.
    #[must_use]
    pub fn terrain_html(&self) -> &str {
        &self.terrain
    }

    /// Conditions page markup, if one was fetched.
    #[must_use]
    pub fn conditions_html(&self) -> Option<&str> {
        self.conditions.as_deref()
    }
}

/// Resort-specific translation of page markup into a canonical report.
pub trait ResortAdapter: Send + Sync + fmt::Debug {
    /// The resort this adapter covers.
    fn resort(&self) -> Resort;

    /// Pages to fetch for one run.
    fn urls(&self) -> PageUrls;

    /// Extracts terrain status, snowfall and report text.
    ///
    /// Must list every tracked terrain of [`Self::resort`], defaulting to
    /// closed when no signal was found.
    fn scrape(&self, page: &PageSource) -> RawTerrainReport;
}

/// Working set of statuses for one resort, pre-filled with `closed`.
///
/// Guarantees the adapter output lists every tracked name exactly once,
/// in catalogue order, whatever the page contained.
#[derive(Debug, Clone)]
pub struct TerrainBoard {
    entries: Vec<(&'static str, TerrainStatus)>,
}

impl TerrainBoard {
    /// Creates a board with every tracked terrain closed.
    #[must_use]
    pub fn new(resort: Resort) -> Self {
        Self {
            entries: resort
                .tracked_terrain()
                .iter()
                .map(|name| (*name, TerrainStatus::Closed))
                .collect(),
        }
    }

    /// Tracked names whose lowercase form occurs in `haystack_lower`.
    #[must_use]
    pub fn mentioned_in(&self, haystack_lower: &str) -> Vec<&'static str> {
        self.entries
            .iter()
            .map(|(name, _)| *name)
            .filter(|name| haystack_lower.contains(&name.to_lowercase()))
            .collect()
    }

    /// Returns the tracked name equal to `text`, if any.
    #[must_use]
    pub fn exact(&self, text: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .map(|(name, _)| *name)
            .find(|name| *name == text)
    }

    /// Overwrites the status of a tracked name. Returns `false` for
    /// untracked names, which are ignored.
    pub fn set(&mut self, name: &str, status: TerrainStatus) -> bool {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => {
                entry.1 = status;
                true
            }
            None => false,
        }
    }

    /// Current status of a tracked name.
    #[must_use]
    pub fn status(&self, name: &str) -> Option<TerrainStatus> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, status)| *status)
    }

    /// Converts the board into report readings.
    #[must_use]
    pub fn into_readings(self) -> Vec<TerrainReading> {
        self.entries
            .into_iter()
            .map(|(name, status)| TerrainReading {
                name: name.to_string(),
                status,
            })
            .collect()
    }
}
