//! Service layer: cycle orchestration and read-side queries.
//!
//! [`ScrapeCycle`] drives adapters and writes to the store.
//! [`QueryService`] answers every read, building streaks and history
//! views on demand through the pure functions in [`history`].

pub mod cycle;
pub mod history;
pub mod query;

pub use cycle::{CycleOutcome, CycleReport, ResortOutcome, ScrapeCycle};
pub use history::{DailyView, FullHistory, TerrainDay};
pub use query::QueryService;
