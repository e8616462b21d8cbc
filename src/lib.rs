//! # terrain-tracker
//!
//! Scrapes ski resort conditions pages and records, day by day, whether
//! each resort's advanced terrain opened.
//!
//! Every cycle fetches each resort's pages, normalizes the terrain status
//! signals they expose (SVG fill colors, image alt text, phrases) to
//! open/closed/pending, appends a snapshot per terrain, and folds it into a
//! daily summary whose `ever_opened` flag never reverts within a day. The
//! read side derives closed streaks and history matrices on demand.
//!
//! ## Architecture
//!
//! ```text
//! Scheduler (main)                 Clients (HTTP)
//!     │                                 │
//!     ├── ScrapeCycle (service/)        ├── REST Handlers (api/)
//!     │     │                           │
//!     │     ├── PageFetcher (scrape/)   ├── QueryService (service/)
//!     │     └── ResortAdapters          │     └── history views
//!     │                                 │
//!     └──────────── TerrainStore (persistence/) ─┘
//!                   ├── MemoryStore
//!                   └── SqliteStore
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod scrape;
pub mod service;
