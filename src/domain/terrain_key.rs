//! Validated `(resort, terrain)` identifier.
//!
//! [`TerrainKey`] can only be built for a terrain name the resort actually
//! tracks, so a key reaching the store is never an adapter typo.

use std::fmt;

use serde::Serialize;

use super::Resort;
use crate::error::TrackerError;

/// Identifies one tracked terrain at one resort.
///
/// Displayed as `"resort|terrain"`, the key format used by the history
/// matrix and open-time maps.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TerrainKey {
    resort: Resort,
    terrain: String,
}

impl TerrainKey {
    /// Creates a key after checking the terrain is tracked for `resort`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::UnknownTerrain`] if the name is empty or not
    /// in the resort's catalogue.
    pub fn new(resort: Resort, terrain: &str) -> Result<Self, TrackerError> {
        if !resort.tracks(terrain) {
            return Err(TrackerError::UnknownTerrain {
                resort: resort.to_string(),
                terrain: terrain.to_string(),
            });
        }
        Ok(Self {
            resort,
            terrain: terrain.to_string(),
        })
    }

    /// Parses both halves from raw strings.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::UnknownResort`] or
    /// [`TrackerError::UnknownTerrain`] when either half is not tracked.
    pub fn parse(resort: &str, terrain: &str) -> Result<Self, TrackerError> {
        Self::new(resort.parse()?, terrain)
    }

    /// Returns the resort half of the key.
    #[must_use]
    pub const fn resort(&self) -> Resort {
        self.resort
    }

    /// Returns the terrain name half of the key.
    #[must_use]
    pub fn terrain(&self) -> &str {
        &self.terrain
    }
}

impl fmt::Display for TerrainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.resort, self.terrain)
    }
}
