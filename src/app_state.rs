//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate, Utc};

use crate::service::QueryService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Read-side queries.
    pub queries: Arc<QueryService>,
    /// Offset defining "today" when a request omits the date.
    pub utc_offset: FixedOffset,
}

impl AppState {
    /// Creates the state.
    #[must_use]
    pub fn new(queries: Arc<QueryService>, utc_offset: FixedOffset) -> Self {
        Self {
            queries,
            utc_offset,
        }
    }

    /// Current calendar date in the tracker's offset.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.utc_offset).date_naive()
    }
}
