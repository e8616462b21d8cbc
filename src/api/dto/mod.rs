//! Data Transfer Objects for REST request/response serialization.
//!
//! Dates travel as `YYYY-MM-DD` strings. Date-keyed maps serialize as JSON
//! objects in ascending date order.

pub mod common_dto;
pub mod history_dto;
pub mod status_dto;

pub use common_dto::*;
pub use history_dto::*;
pub use status_dto::*;
