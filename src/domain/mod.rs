//! Domain layer: resorts, terrain identity, status, and records.
//!
//! This module holds the pure data model: which resorts and terrain are
//! tracked, how raw page signals normalize to a [`TerrainStatus`], and the
//! snapshot/daily-summary records with their merge rule.

pub mod cycle_id;
pub mod records;
pub mod resort;
pub mod status;
pub mod terrain_key;

pub use cycle_id::CycleId;
pub use records::{
    DailyObservation, DailySummary, RawTerrainReport, SnowReport, TerrainReading, TerrainSnapshot,
};
pub use resort::Resort;
pub use status::{RawSignal, TerrainStatus, normalize};
pub use terrain_key::TerrainKey;
