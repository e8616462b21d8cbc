//! Brighton: status is an `<img alt="Open">` / `<img alt="Closed">` icon
//! somewhere near the trail name.
//!
//! The trail list has no stable classes, so the adapter finds text nodes
//! equal to a tracked name and climbs the tree until an ancestor contains
//! a status icon.

use scraper::{ElementRef, Html, Selector};

use super::adapter::{PageSource, PageUrls, ResortAdapter, TerrainBoard};
use super::extract::{ReportExtractor, SnowPatterns, page_text, selector};
use crate::domain::{RawSignal, RawTerrainReport, Resort, normalize};
use crate::error::TrackerError;

const URL: &str = "https://www.brightonresort.com/conditions";

/// Ancestor levels searched above the name's own element.
const MAX_CLIMB: usize = 10;

const STATUS_ALTS: [&str; 2] = ["Open", "Closed"];

const SNOW_PATTERNS: [&str; 2] = [
    r#"([\d.]+)["″\s]*Snow\s*24\s*Hrs"#,
    r"Snow\s*24\s*Hrs[.\s]*([\d.]+)",
];

const REPORT_SELECTORS: [&str; 6] = [
    ".conditions-report",
    ".morning-report",
    ".snow-report",
    "[class*=\"report\"]",
    "[class*=\"comment\"]",
    "[class*=\"condition\"]",
];

/// Adapter for Brighton's conditions page.
#[derive(Debug, Clone)]
pub struct BrightonAdapter {
    images: Selector,
    snow: SnowPatterns,
    report: ReportExtractor,
}

impl BrightonAdapter {
    /// Compiles the adapter's selectors and patterns.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Pattern`] if a built-in pattern is invalid.
    pub fn new() -> Result<Self, TrackerError> {
        Ok(Self {
            images: selector("img")?,
            snow: SnowPatterns::new(&SNOW_PATTERNS)?,
            report: ReportExtractor::from_selectors(&REPORT_SELECTORS)?,
        })
    }

    fn read_terrain(&self, document: &Html, board: &mut TerrainBoard) {
        for node in document.root_element().descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            let Some(name) = board.exact(text.trim()) else {
                continue;
            };
            // Start above the name's own element: the icon is a sibling
            // branch, never a child of the label.
            let alt = node
                .ancestors()
                .skip(1)
                .take(MAX_CLIMB)
                .filter_map(ElementRef::wrap)
                .find_map(|ancestor| {
                    ancestor
                        .select(&self.images)
                        .filter_map(|img| img.value().attr("alt"))
                        .find(|alt| STATUS_ALTS.contains(alt))
                });
            if let Some(alt) = alt {
                board.set(name, normalize(&RawSignal::AltText(alt)));
            }
        }
    }
}

impl ResortAdapter for BrightonAdapter {
    fn resort(&self) -> Resort {
        Resort::Brighton
    }

    fn urls(&self) -> PageUrls {
        PageUrls::single(URL)
    }

    fn scrape(&self, page: &PageSource) -> RawTerrainReport {
        let document = Html::parse_document(page.terrain_html());
        let mut board = TerrainBoard::new(Resort::Brighton);
        self.read_terrain(&document, &mut board);
        tracing::debug!(resort = "brighton", ?board, "terrain parsed");

        RawTerrainReport {
            snow_24hr: self.snow.extract_or_zero(&page_text(&document)),
            report_text: self.report.extract(&document),
            terrain: board.into_readings(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{TerrainReading, TerrainStatus};

    fn adapter() -> BrightonAdapter {
        let Ok(adapter) = BrightonAdapter::new() else {
            panic!("adapter builds");
        };
        adapter
    }

    fn status_of(readings: &[TerrainReading], name: &str) -> Option<TerrainStatus> {
        readings.iter().find(|r| r.name == name).map(|r| r.status)
    }

    const PAGE: &str = r#"
        <h2>Trail Status</h2>
        <ul>
          <li><div class="row"><div class="icon"><img alt="Open" src="o.svg"></div>
              <div class="label"><span>Milly Bowl</span></div></div></li>
          <li><div class="row"><div class="icon"><img alt="Closed" src="c.svg"></div>
              <div class="label"><span>Snake Bowl</span></div></div></li>
        </ul>
        <div class="totals"><span>6"</span><span>Snow 24 Hrs</span></div>
        <div class="snow-comment">Six inches of new snow overnight; Milly opened at 9:30 after a short hold.</div>"#;

    #[test]
    fn climbs_to_nearest_status_icon() {
        let report = adapter().scrape(&PageSource::new(PAGE));
        assert_eq!(status_of(&report.terrain, "Milly Bowl"), Some(TerrainStatus::Open));
        assert_eq!(status_of(&report.terrain, "Snake Bowl"), Some(TerrainStatus::Closed));
    }

    #[test]
    fn reads_snow_before_label() {
        let report = adapter().scrape(&PageSource::new(PAGE));
        assert!((report.snow_24hr - 6.0).abs() < f64::EPSILON);
        assert!(report.report_text.starts_with("Six inches"));
    }

    #[test]
    fn snow_after_label_fallback() {
        let page = "<p>Snow 24 Hrs</p><p>3.5</p>";
        let report = adapter().scrape(&PageSource::new(page));
        assert!((report.snow_24hr - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_name_match_is_ignored() {
        let page = r#"<div><div><span>Milly Bowl Traverse</span><img alt="Open"></div></div>"#;
        let report = adapter().scrape(&PageSource::new(page));
        assert_eq!(status_of(&report.terrain, "Milly Bowl"), Some(TerrainStatus::Closed));
    }

    #[test]
    fn page_without_signals_lists_all_terrain_closed() {
        let report = adapter().scrape(&PageSource::new(""));
        assert_eq!(report.terrain.len(), Resort::Brighton.tracked_terrain().len());
        assert!(report.terrain.iter().all(|r| r.status == TerrainStatus::Closed));
        assert!(report.snow_24hr.abs() < f64::EPSILON);
    }
}
