//! Scraping layer: page retrieval and per-resort adapters.
//!
//! Each resort publishes status in its own way (SVG fill colors, image alt
//! text, table phrases, free text). An adapter hides those differences
//! behind [`ResortAdapter`] and always returns the full tracked terrain list.

pub mod adapter;
pub mod brighton;
pub mod extract;
pub mod fetch;
pub mod snowbasin;
pub mod snowbird;
pub mod solitude;

use std::sync::Arc;

pub use adapter::{PageSource, PageUrls, ResortAdapter, TerrainBoard};
pub use brighton::BrightonAdapter;
pub use fetch::{HttpFetcher, PageFetcher, fetch_pages};
pub use snowbasin::SnowbasinAdapter;
pub use snowbird::SnowbirdAdapter;
pub use solitude::SolitudeAdapter;

use crate::domain::Resort;
use crate::error::TrackerError;

/// Builds the adapter for one resort.
///
/// # Errors
///
/// Returns [`TrackerError::Pattern`] if a built-in pattern is invalid.
pub fn adapter_for(resort: Resort) -> Result<Arc<dyn ResortAdapter>, TrackerError> {
    Ok(match resort {
        Resort::Snowbird => Arc::new(SnowbirdAdapter::new()?),
        Resort::Solitude => Arc::new(SolitudeAdapter::new()?),
        Resort::Brighton => Arc::new(BrightonAdapter::new()?),
        Resort::Snowbasin => Arc::new(SnowbasinAdapter::new()?),
    })
}

/// One adapter per tracked resort, in catalogue order.
///
/// # Errors
///
/// Returns [`TrackerError::Pattern`] if a built-in pattern is invalid.
pub fn standard_adapters() -> Result<Vec<Arc<dyn ResortAdapter>>, TrackerError> {
    Resort::ALL.into_iter().map(adapter_for).collect()
}
