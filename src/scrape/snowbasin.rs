//! Snowbasin: server-rendered lift table with a "Lift Open" style phrase
//! in each row.

use regex::Regex;
use scraper::{Html, Selector};

use super::adapter::{PageSource, PageUrls, ResortAdapter, TerrainBoard};
use super::extract::{ReportExtractor, SnowPatterns, collapsed_text, page_text, pattern, selector};
use crate::domain::{RawSignal, RawTerrainReport, Resort, normalize};
use crate::error::TrackerError;

const URL: &str = "https://www.snowbasin.com/the-mountain/mountain-report/";

/// Snowfall patterns shared with Solitude's first two rules.
pub(crate) const SNOW_PATTERNS: [&str; 2] = [
    r"24[\s\-]*(?:Hour|Hr|Hrs?)[\s\-]*(?:Snow(?:fall)?)?[:\s]*([\d.]+)",
    r"(?:New|Fresh)\s+Snow[:\s]*([\d.]+)",
];

const REPORT_CLASS_PATTERN: &str = "report|narrative|condition|morning";

/// Adapter for Snowbasin's mountain report.
#[derive(Debug, Clone)]
pub struct SnowbasinAdapter {
    rows: Selector,
    cells: Selector,
    /// Checked in order; the first phrase found decides the row.
    phrases: [Regex; 2],
    snow: SnowPatterns,
    report: ReportExtractor,
}

impl SnowbasinAdapter {
    /// Compiles the adapter's selectors and patterns.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Pattern`] if a built-in pattern is invalid.
    pub fn new() -> Result<Self, TrackerError> {
        Ok(Self {
            rows: selector("tr")?,
            cells: selector("td")?,
            phrases: [
                pattern(r"(?:Lift|Trail)\s+Open")?,
                pattern(r"(?:Lift|Trail)\s+Pending")?,
            ],
            snow: SnowPatterns::new(&SNOW_PATTERNS)?,
            report: ReportExtractor::from_class_pattern(REPORT_CLASS_PATTERN)?,
        })
    }

    fn read_terrain(&self, document: &Html, board: &mut TerrainBoard) {
        for row in document.select(&self.rows) {
            let cells: Vec<String> = row.select(&self.cells).map(collapsed_text).collect();
            if cells.len() < 2 {
                continue;
            }
            let combined = cells.join(" ");
            let mentioned = board.mentioned_in(&combined.to_lowercase());
            if mentioned.is_empty() {
                continue;
            }
            let signal = self
                .phrases
                .iter()
                .find_map(|re| re.find(&combined))
                .map_or(RawSignal::Missing, |m| RawSignal::Text(m.as_str()));
            let status = normalize(&signal);
            for name in mentioned {
                board.set(name, status);
            }
        }
    }
}

impl ResortAdapter for SnowbasinAdapter {
    fn resort(&self) -> Resort {
        Resort::Snowbasin
    }

    fn urls(&self) -> PageUrls {
        PageUrls::single(URL)
    }

    fn scrape(&self, page: &PageSource) -> RawTerrainReport {
        let document = Html::parse_document(page.terrain_html());
        let mut board = TerrainBoard::new(Resort::Snowbasin);
        self.read_terrain(&document, &mut board);
        tracing::debug!(resort = "snowbasin", ?board, "terrain parsed");

        RawTerrainReport {
            snow_24hr: self.snow.extract_or_zero(&page_text(&document)),
            report_text: self.report.extract(&document),
            terrain: board.into_readings(),
        }
    }
}
