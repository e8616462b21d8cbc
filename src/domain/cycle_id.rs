//! Type-safe scrape cycle identifier.
//!
//! [`CycleId`] is a newtype wrapper around [`uuid::Uuid`] (v4). Every log
//! line emitted during one cycle carries it, so a slow or failing resort
//! can be traced back to the run that produced it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for one scrape/aggregate cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CycleId(uuid::Uuid);

impl CycleId {
    /// Creates a new random `CycleId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for CycleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for CycleId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}
