//! Canonical terrain status and the status normalizer.
//!
//! Resorts expose status in different shapes: an SVG fill color, an image
//! alt text, or a free-text table cell. Adapters resolve a single
//! [`RawSignal`] per terrain and [`normalize`] maps it onto
//! [`TerrainStatus`]. Normalization is total: anything unrecognised is
//! [`TerrainStatus::Closed`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// SVG fill color Snowbird uses for an open lift or trail.
pub const OPEN_FILL: &str = "#8BC53F";

/// SVG fill color Snowbird uses for a closed lift or trail.
pub const CLOSED_FILL: &str = "#D0021B";

/// Canonical status of one terrain at one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainStatus {
    /// Terrain reported open.
    Open,
    /// Terrain reported pending (expected to open, e.g. after control work).
    Pending,
    /// Terrain closed, or no usable signal was found.
    Closed,
}

impl TerrainStatus {
    /// Returns the lowercase storage form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Pending => "pending",
            Self::Closed => "closed",
        }
    }

    /// Returns `true` for [`TerrainStatus::Open`].
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for TerrainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TerrainStatus {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "pending" => Ok(Self::Pending),
            "closed" => Ok(Self::Closed),
            other => Err(TrackerError::InvalidObservation(format!(
                "unknown status: {other}"
            ))),
        }
    }
}

/// One resolved status signal for one terrain, as found on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawSignal<'a> {
    /// An SVG `fill` attribute value.
    FillColor(&'a str),
    /// An `<img alt>` value.
    AltText(&'a str),
    /// A free-text fragment such as a table row or a line of page text.
    Text(&'a str),
    /// No signal was located.
    Missing,
}

impl<'a> From<&'a str> for RawSignal<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

/// Maps a raw signal to a canonical status.
///
/// Structural signals (known fill colors, exact alt tokens) win first;
/// anything else falls through to [`normalize_text`].
#[must_use]
pub fn normalize(signal: &RawSignal<'_>) -> TerrainStatus {
    match *signal {
        RawSignal::FillColor(color) => {
            let color = color.trim();
            if color.eq_ignore_ascii_case(OPEN_FILL) {
                TerrainStatus::Open
            } else if color.eq_ignore_ascii_case(CLOSED_FILL) {
                TerrainStatus::Closed
            } else {
                normalize_text(color)
            }
        }
        RawSignal::AltText(alt) => match alt.trim() {
            a if a.eq_ignore_ascii_case("open") => TerrainStatus::Open,
            a if a.eq_ignore_ascii_case("pending") => TerrainStatus::Pending,
            a if a.eq_ignore_ascii_case("closed") => TerrainStatus::Closed,
            other => normalize_text(other),
        },
        RawSignal::Text(text) => normalize_text(text),
        RawSignal::Missing => TerrainStatus::Closed,
    }
}

/// Substring rule for free text: `"open"` beats `"pending"`, default closed.
#[must_use]
pub fn normalize_text(text: &str) -> TerrainStatus {
    let lower = text.trim().to_lowercase();
    if lower.contains("open") {
        TerrainStatus::Open
    } else if lower.contains("pending") {
        TerrainStatus::Pending
    } else {
        TerrainStatus::Closed
    }
}
