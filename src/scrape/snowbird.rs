//! Snowbird: status is an SVG fill color inside each lift/trail row.
//!
//! The lift and trail report renders rows with a `td.name` cell and a
//! `td.status` cell whose icon paths are filled green when open and red
//! when closed. Snowfall and the morning report live on a separate
//! current-conditions page.

use scraper::{Html, Selector};

use super::adapter::{PageSource, PageUrls, ResortAdapter, TerrainBoard};
use super::extract::{ReportExtractor, SnowPatterns, collapsed_text, page_text, selector};
use crate::domain::status::OPEN_FILL;
use crate::domain::{RawSignal, RawTerrainReport, Resort, normalize};
use crate::error::TrackerError;

const TERRAIN_URL: &str = "https://www.snowbird.com/the-mountain/mountain-report/lift-trail-report/";
const CONDITIONS_URL: &str =
    "https://www.snowbird.com/the-mountain/mountain-report/current-conditions-weather/";

const SNOW_PATTERNS: [&str; 2] = [
    r"24[\s\-]*(?:Hour|Hr)[\s\-]*Snow\s*([\d.]+)",
    r#"([\d.]+)\s*["″]\s*24"#,
];

/// Report selectors, also used by Solitude.
pub(crate) const REPORT_SELECTORS: [&str; 6] = [
    ".conditions-report",
    ".morning-report",
    ".snow-report",
    "[class*=\"report\"]",
    "[class*=\"narrative\"]",
    "[class*=\"condition\"]",
];

/// Adapter for Snowbird's lift/trail and conditions pages.
#[derive(Debug, Clone)]
pub struct SnowbirdAdapter {
    rows: Selector,
    name_cell: Selector,
    status_cell: Selector,
    filled_paths: Selector,
    snow: SnowPatterns,
    report: ReportExtractor,
}

impl SnowbirdAdapter {
    /// Compiles the adapter's selectors and patterns.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Pattern`] if a built-in pattern is invalid.
    pub fn new() -> Result<Self, TrackerError> {
        Ok(Self {
            rows: selector("tr")?,
            name_cell: selector("td.name")?,
            status_cell: selector("td.status")?,
            filled_paths: selector("path[fill]")?,
            snow: SnowPatterns::new(&SNOW_PATTERNS)?,
            report: ReportExtractor::from_selectors(&REPORT_SELECTORS)?,
        })
    }

    fn read_terrain(&self, html: &str, board: &mut TerrainBoard) {
        let document = Html::parse_document(html);
        for row in document.select(&self.rows) {
            let (Some(name_cell), Some(status_cell)) = (
                row.select(&self.name_cell).next(),
                row.select(&self.status_cell).next(),
            ) else {
                continue;
            };
            let page_name = collapsed_text(name_cell).to_lowercase();
            let fills: Vec<&str> = status_cell
                .select(&self.filled_paths)
                .filter_map(|path| path.value().attr("fill"))
                .filter(|fill| !is_blank_fill(fill))
                .collect();
            // Any green path marks the row open, whatever else is drawn.
            let signal = fills
                .iter()
                .find(|fill| fill.eq_ignore_ascii_case(OPEN_FILL))
                .or_else(|| fills.first())
                .map_or(RawSignal::Missing, |fill| RawSignal::FillColor(fill));
            let status = normalize(&signal);
            for name in board.mentioned_in(&page_name) {
                board.set(name, status);
            }
        }
    }
}

fn is_blank_fill(fill: &str) -> bool {
    fill.eq_ignore_ascii_case("none") || fill.eq_ignore_ascii_case("#fff")
}

impl ResortAdapter for SnowbirdAdapter {
    fn resort(&self) -> Resort {
        Resort::Snowbird
    }

    fn urls(&self) -> PageUrls {
        PageUrls {
            terrain: TERRAIN_URL,
            conditions: Some(CONDITIONS_URL),
        }
    }

    fn scrape(&self, page: &PageSource) -> RawTerrainReport {
        let mut board = TerrainBoard::new(Resort::Snowbird);
        self.read_terrain(page.terrain_html(), &mut board);
        tracing::debug!(resort = "snowbird", ?board, "terrain parsed");

        let (snow_24hr, report_text) = page.conditions_html().map_or_else(
            || (0.0, String::new()),
            |html| {
                let document = Html::parse_document(html);
                (
                    self.snow.extract_or_zero(&page_text(&document)),
                    self.report.extract(&document),
                )
            },
        );

        RawTerrainReport {
            snow_24hr,
            report_text,
            terrain: board.into_readings(),
        }
    }
}
