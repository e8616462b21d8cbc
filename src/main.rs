//! terrain-tracker server entry point.
//!
//! Opens the store, starts the scrape trigger, and serves the read-only
//! HTTP API.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use tokio::time::MissedTickBehavior;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use terrain_tracker::api;
use terrain_tracker::app_state::AppState;
use terrain_tracker::config::{LogFormat, TrackerConfig};
use terrain_tracker::persistence::{MemoryStore, SqliteStore, TerrainStore};
use terrain_tracker::scrape::{HttpFetcher, standard_adapters};
use terrain_tracker::service::{QueryService, ScrapeCycle};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = TrackerConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Initialize tracing
    init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting terrain-tracker");

    // Build persistence layer
    let store: Arc<dyn TerrainStore> = if config.persistence_enabled {
        Arc::new(
            SqliteStore::open(&config.database_url, config.database_max_connections)
                .await
                .context("failed to open database")?,
        )
    } else {
        tracing::warn!("persistence disabled, history is kept in memory only");
        Arc::new(MemoryStore::new())
    };

    // Build scrape layer
    let fetcher = Arc::new(HttpFetcher::new(config.fetch_timeout()).context("http client")?);
    let adapters = standard_adapters().context("building resort adapters")?;
    let cycle = Arc::new(
        ScrapeCycle::new(Arc::clone(&store), fetcher, adapters)
            .with_adapter_timeout(config.adapter_timeout())
            .with_utc_offset(config.utc_offset),
    );
    spawn_trigger(cycle, config.scrape_interval(), config.scrape_on_startup);

    // Build application state
    let queries = Arc::new(QueryService::new(store));
    let app_state = AppState::new(queries, config.utc_offset);

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
    }
}

/// Runs cycles on a fixed schedule. Each tick runs on its own task, so a
/// tick that lands while a slow cycle is still running is skipped by the
/// cycle's in-flight guard.
fn spawn_trigger(cycle: Arc<ScrapeCycle>, every: Option<Duration>, run_now: bool) {
    let Some(every) = every else {
        if run_now {
            tokio::spawn(async move {
                cycle.run().await;
            });
        } else {
            tracing::info!("no scrape schedule configured");
        }
        return;
    };

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        if !run_now {
            ticker.tick().await;
        }
        tracing::info!(every_secs = every.as_secs(), "scrape schedule started");
        loop {
            ticker.tick().await;
            let cycle = Arc::clone(&cycle);
            tokio::spawn(async move {
                cycle.run().await;
            });
        }
    });
}
