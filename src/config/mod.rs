//! Configuration module for the FindIt backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Path to Tantivy search index directory
    pub index_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Interval between verification scan progress ticks
    pub scan_tick: Duration,
    /// Pause between a successful scan and the claim effects
    pub scan_success_delay: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path = env::var("FINDIT_DB_PATH")
            .unwrap_or_else(|_| "./data/findit.sqlite".to_string())
            .into();

        let index_path = env::var("FINDIT_INDEX_PATH")
            .unwrap_or_else(|_| "./data/index".to_string())
            .into();

        let bind_addr = env::var("FINDIT_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid FINDIT_BIND_ADDR format");

        let log_level = env::var("FINDIT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let scan_tick = Duration::from_millis(duration_ms("FINDIT_SCAN_TICK_MS", 150));
        let scan_success_delay =
            Duration::from_millis(duration_ms("FINDIT_SCAN_SUCCESS_DELAY_MS", 1500));

        Self {
            db_path,
            index_path,
            bind_addr,
            log_level,
            scan_tick,
            scan_success_delay,
        }
    }
}

fn duration_ms(var: &str, default: u64) -> u64 {
    env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
