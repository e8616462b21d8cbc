//! Solitude: no single reliable structure, so status is read in three
//! passes over the same page, each later pass overriding the earlier ones.
//!
//! 1. Table rows with at least two cells, classified by their text.
//! 2. Page text lines naming the terrain, when they contain the word
//!    `open` or `pending`.
//! 3. Short container elements whose text after the terrain name
//!    mentions `open`.

use regex::Regex;
use scraper::{Html, Selector};

use super::adapter::{PageSource, PageUrls, ResortAdapter, TerrainBoard};
use super::extract::{ReportExtractor, SnowPatterns, collapsed_text, page_text, pattern, selector};
use super::{snowbasin, snowbird};
use crate::domain::{RawSignal, RawTerrainReport, Resort, TerrainStatus, normalize};
use crate::error::TrackerError;

const URL: &str = "https://www.solitudemountain.com/mountain-and-village/conditions-and-maps";

/// Elements at or above this many characters are page sections, not tiles.
const MAX_TILE_CHARS: usize = 300;

/// Characters after the terrain name inspected by the tile pass.
const TILE_WINDOW: usize = 80;

const LOOSE_SNOW_PATTERN: &str = r#"([\d.]+)["″\s]*(?:in)?\s*(?:new|last|24)"#;

/// Adapter for Solitude's conditions page.
#[derive(Debug, Clone)]
pub struct SolitudeAdapter {
    rows: Selector,
    cells: Selector,
    tiles: Selector,
    open_word: Regex,
    pending_word: Regex,
    snow: SnowPatterns,
    report: ReportExtractor,
}

impl SolitudeAdapter {
    /// Compiles the adapter's selectors and patterns.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Pattern`] if a built-in pattern is invalid.
    pub fn new() -> Result<Self, TrackerError> {
        let [primary, fresh] = snowbasin::SNOW_PATTERNS;
        Ok(Self {
            rows: selector("tr")?,
            cells: selector("td, th")?,
            tiles: selector("div, li, span, button, a")?,
            open_word: pattern(r"\bopen\b")?,
            pending_word: pattern(r"\bpending\b")?,
            snow: SnowPatterns::new(&[primary, fresh, LOOSE_SNOW_PATTERN])?,
            report: ReportExtractor::from_selectors(&snowbird::REPORT_SELECTORS)?,
        })
    }

    fn read_rows(&self, document: &Html, board: &mut TerrainBoard) {
        for row in document.select(&self.rows) {
            let cells: Vec<String> = row.select(&self.cells).map(collapsed_text).collect();
            if cells.len() < 2 {
                continue;
            }
            let combined = cells.join(" ");
            let status = normalize(&RawSignal::Text(&combined));
            for name in board.mentioned_in(&combined.to_lowercase()) {
                board.set(name, status);
            }
        }
    }

    fn read_lines(&self, text: &str, board: &mut TerrainBoard) {
        for line in text.lines().map(str::trim) {
            let status = if self.open_word.is_match(line) {
                TerrainStatus::Open
            } else if self.pending_word.is_match(line) {
                TerrainStatus::Pending
            } else {
                continue;
            };
            for name in board.mentioned_in(&line.to_lowercase()) {
                board.set(name, status);
            }
        }
    }

    fn read_tiles(&self, document: &Html, board: &mut TerrainBoard) {
        for tile in document.select(&self.tiles) {
            let text = collapsed_text(tile);
            if text.chars().count() >= MAX_TILE_CHARS {
                continue;
            }
            let lower = text.to_lowercase();
            for name in board.mentioned_in(&lower) {
                let Some((_, after)) = lower.rsplit_once(&name.to_lowercase()) else {
                    continue;
                };
                let window: String = after.chars().take(TILE_WINDOW).collect();
                if window.contains("open") {
                    board.set(name, TerrainStatus::Open);
                }
            }
        }
    }
}

impl ResortAdapter for SolitudeAdapter {
    fn resort(&self) -> Resort {
        Resort::Solitude
    }

    fn urls(&self) -> PageUrls {
        PageUrls::single(URL)
    }

    fn scrape(&self, page: &PageSource) -> RawTerrainReport {
        let document = Html::parse_document(page.terrain_html());
        let text = page_text(&document);
        let mut board = TerrainBoard::new(Resort::Solitude);
        self.read_rows(&document, &mut board);
        self.read_lines(&text, &mut board);
        self.read_tiles(&document, &mut board);
        tracing::debug!(resort = "solitude", ?board, "terrain parsed");

        RawTerrainReport {
            snow_24hr: self.snow.extract_or_zero(&text),
            report_text: self.report.extract(&document),
            terrain: board.into_readings(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::TerrainReading;

    fn adapter() -> SolitudeAdapter {
        let Ok(adapter) = SolitudeAdapter::new() else {
            panic!("adapter builds");
        };
        adapter
    }

    fn status_of(readings: &[TerrainReading], name: &str) -> Option<TerrainStatus> {
        readings.iter().find(|r| r.name == name).map(|r| r.status)
    }

    const PAGE: &str = r#"
        <table>
          <tr><th>Honeycomb Canyon</th><td>Open</td></tr>
          <tr><td>Summit Express</td><td>Closed</td></tr>
        </table>
        <ul>
          <li>Highway to Heaven - Pending</li>
          <li><span>Fantasy Ridge</span><span>Opening soon</span></li>
        </ul>"#;

    #[test]
    fn passes_combine() {
        let report = adapter().scrape(&PageSource::new(PAGE));
        let t = &report.terrain;
        assert_eq!(status_of(t, "Honeycomb Canyon"), Some(TerrainStatus::Open));
        assert_eq!(status_of(t, "Summit Express"), Some(TerrainStatus::Closed));
        assert_eq!(status_of(t, "Highway to Heaven"), Some(TerrainStatus::Pending));
        assert_eq!(status_of(t, "Fantasy Ridge"), Some(TerrainStatus::Open));
        assert_eq!(status_of(t, "Evergreen Peak"), Some(TerrainStatus::Closed));
    }

    #[test]
    fn line_pass_joins_inline_siblings() {
        let page = "<ul><li><span>Highway to Heaven</span> <span>Pending</span></li></ul>";
        let report = adapter().scrape(&PageSource::new(page));
        assert_eq!(
            status_of(&report.terrain, "Highway to Heaven"),
            Some(TerrainStatus::Pending)
        );
    }

    #[test]
    fn tile_pass_reads_text_after_name() {
        let page = "<div>Evergreen Peak reopens at noon</div>";
        let report = adapter().scrape(&PageSource::new(page));
        assert_eq!(status_of(&report.terrain, "Evergreen Peak"), Some(TerrainStatus::Open));
    }

    #[test]
    fn tile_pass_ignores_long_sections() {
        let page = format!(
            "<div>Evergreen Peak reopens at noon. {}</div>",
            "filler ".repeat(50)
        );
        let report = adapter().scrape(&PageSource::new(page));
        assert_eq!(status_of(&report.terrain, "Evergreen Peak"), Some(TerrainStatus::Closed));
    }

    #[test]
    fn snow_pattern_chain() {
        let a = adapter();
        let report = a.scrape(&PageSource::new("<p>24 Hour Snowfall: 7</p>"));
        assert!((report.snow_24hr - 7.0).abs() < f64::EPSILON);
        let report = a.scrape(&PageSource::new("<p>New Snow: 4</p>"));
        assert!((report.snow_24hr - 4.0).abs() < f64::EPSILON);
        let report = a.scrape(&PageSource::new(r#"<p>3" in last day</p>"#));
        assert!((report.snow_24hr - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn report_uses_selector_chain() {
        let page = r#"<div class="conditions-report">Wind hold on the upper lifts until patrol finishes control work this morning.</div>"#;
        let report = adapter().scrape(&PageSource::new(page));
        assert!(report.report_text.starts_with("Wind hold"));
    }

    #[test]
    fn page_without_signals_lists_all_terrain_closed() {
        let report = adapter().scrape(&PageSource::new(""));
        assert_eq!(report.terrain.len(), Resort::Solitude.tracked_terrain().len());
        assert!(report.terrain.iter().all(|r| r.status == TerrainStatus::Closed));
    }
}
