//! Tracked resorts and their terrain catalogue.
//!
//! [`Resort`] is a closed set: adding a resort means adding a variant here,
//! a tracked terrain list, and an adapter in [`crate::scrape`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// A ski resort whose conditions page is scraped every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resort {
    /// Snowbird (Little Cottonwood Canyon).
    Snowbird,
    /// Solitude (Big Cottonwood Canyon).
    Solitude,
    /// Brighton (Big Cottonwood Canyon).
    Brighton,
    /// Snowbasin (Ogden Valley).
    Snowbasin,
}

impl Resort {
    /// Every tracked resort, in catalogue order.
    pub const ALL: [Self; 4] = [
        Self::Snowbird,
        Self::Solitude,
        Self::Brighton,
        Self::Snowbasin,
    ];

    /// Returns the lowercase identifier used in storage and JSON keys.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Snowbird => "snowbird",
            Self::Solitude => "solitude",
            Self::Brighton => "brighton",
            Self::Snowbasin => "snowbasin",
        }
    }

    /// Returns the terrain names tracked for this resort.
    ///
    /// Every adapter report lists exactly these names, in this order.
    #[must_use]
    pub const fn tracked_terrain(&self) -> &'static [&'static str] {
        match self {
            Self::Snowbird => &["Mineral Basin", "Cirque Traverse", "High Baldy"],
            Self::Solitude => &[
                "Honeycomb Canyon",
                "Summit Express",
                "Highway to Heaven",
                "Fantasy Ridge",
                "Evergreen Peak",
            ],
            Self::Brighton => &["Milly Bowl", "Snake Bowl"],
            Self::Snowbasin => &[
                "Allen Peak Tram",
                "Strawberry Gondola",
                "Middle Bowl Cirque Gate",
                "Upper Mt Ogden Bowl Gate",
            ],
        }
    }

    /// Returns `true` if `terrain` is one of this resort's tracked names.
    #[must_use]
    pub fn tracks(&self, terrain: &str) -> bool {
        self.tracked_terrain().contains(&terrain)
    }
}

impl fmt::Display for Resort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resort {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TrackerError::UnknownResort(s.to_string()))
    }
}
