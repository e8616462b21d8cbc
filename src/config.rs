//! Tracker configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Missing or unparseable values fall back
//! to defaults, except the listen address and UTC offset which are
//! rejected.

use std::net::SocketAddr;
use std::time::Duration;

use chrono::FixedOffset;

/// Boxed configuration error.
pub type ConfigError = Box<dyn std::error::Error + Send + Sync>;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

/// Top-level tracker configuration.
///
/// Loaded once at startup via [`TrackerConfig::from_env`].
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Socket address to bind the HTTP server to.
    pub listen_addr: SocketAddr,

    /// SQLite connection string.
    pub database_url: String,

    /// Maximum number of database connections in the pool.
    pub database_max_connections: u32,

    /// `false` keeps everything in memory.
    pub persistence_enabled: bool,

    /// Budget for one adapter's fetch and parse, in seconds.
    pub adapter_timeout_secs: u64,

    /// Timeout of a single HTTP request, in seconds.
    pub fetch_timeout_secs: u64,

    /// Seconds between scheduled cycles (0 = no schedule).
    pub scrape_interval_secs: u64,

    /// Run a cycle immediately at startup.
    pub scrape_on_startup: bool,

    /// Offset defining the local calendar date of an observation.
    pub utc_offset: FixedOffset,

    /// Log output format.
    pub log_format: LogFormat,
}

impl TrackerConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` cannot be parsed as a
    /// [`SocketAddr`] or `TRACKER_UTC_OFFSET_HOURS` is not a valid offset.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr: SocketAddr = lookup("LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()?;

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://data/terrain.db".to_string());
        let database_max_connections = parse_env(&lookup, "DATABASE_MAX_CONNECTIONS", 5);
        let persistence_enabled = parse_env_bool(&lookup, "PERSISTENCE_ENABLED", true);

        let adapter_timeout_secs = parse_env(&lookup, "ADAPTER_TIMEOUT_SECS", 60);
        let fetch_timeout_secs = parse_env(&lookup, "FETCH_TIMEOUT_SECS", 30);
        let scrape_interval_secs = parse_env(&lookup, "SCRAPE_INTERVAL_SECS", 3600);
        let scrape_on_startup = parse_env_bool(&lookup, "SCRAPE_ON_STARTUP", true);

        let offset_hours: i32 = match lookup("TRACKER_UTC_OFFSET_HOURS") {
            Some(raw) => raw.trim().parse()?,
            None => -7,
        };
        let utc_offset = offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| format!("TRACKER_UTC_OFFSET_HOURS out of range: {offset_hours}"))?;

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            listen_addr,
            database_url,
            database_max_connections,
            persistence_enabled,
            adapter_timeout_secs,
            fetch_timeout_secs,
            scrape_interval_secs,
            scrape_on_startup,
            utc_offset,
            log_format,
        })
    }

    /// Per-adapter budget.
    #[must_use]
    pub const fn adapter_timeout(&self) -> Duration {
        Duration::from_secs(self.adapter_timeout_secs)
    }

    /// Per-request HTTP timeout.
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Interval of the bundled trigger, `None` when disabled.
    #[must_use]
    pub const fn scrape_interval(&self) -> Option<Duration> {
        if self.scrape_interval_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.scrape_interval_secs))
        }
    }
}

/// Parses a variable as `T`, returning `default` on missing or invalid
/// values.
fn parse_env<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parses a variable as a boolean. Accepts `"true"`, `"1"`, `"false"`,
/// `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("true" | "1") => true,
        Some("false" | "0") => false,
        _ => default,
    }
}
