use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::Context;
use chrono_tz::Tz;
use fundwatch_core::constants::{DEFAULT_CHUNK_DAYS, DEFAULT_CHUNK_PAUSE_MS};
use fundwatch_core::ingestion::IngestionConfig;
use fundwatch_core::utils::time_utils::parse_timezone;
use fundwatch_market_data::provider::tefas::{DEFAULT_BASE_URL, DEFAULT_FUND_KIND};

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    /// Bounds health and alert requests. Job routes run to completion.
    pub request_timeout: Duration,
    /// Zone in which "today" is computed for every job.
    pub timezone: Tz,
    pub ingestion: IngestionConfig,
    pub tefas_base_url: String,
    pub fund_kind: String,
    /// Seed file for `fund_labels`, loaded only while the table is empty.
    pub labels_csv: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = env_or("FW_LISTEN_ADDR", "0.0.0.0:8080")
            .parse()
            .context("Invalid FW_LISTEN_ADDR")?;
        let db_path = env_or("FW_DB_PATH", "./db/fundwatch.db");
        let cors_allow = env_or("FW_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = env_or("FW_REQUEST_TIMEOUT_MS", "300000")
            .parse()
            .context("Invalid FW_REQUEST_TIMEOUT_MS")?;
        let timezone = parse_timezone(&env_or("FW_TIMEZONE", "Europe/Istanbul"))?;

        let chunk_days: i64 = env_or("FW_FETCH_CHUNK_DAYS", &DEFAULT_CHUNK_DAYS.to_string())
            .parse()
            .context("Invalid FW_FETCH_CHUNK_DAYS")?;
        let pause_ms: u64 = env_or("FW_FETCH_PAUSE_MS", &DEFAULT_CHUNK_PAUSE_MS.to_string())
            .parse()
            .context("Invalid FW_FETCH_PAUSE_MS")?;
        let ingestion = IngestionConfig::new(chunk_days, Duration::from_millis(pause_ms))?;

        let labels_csv = std::env::var("FW_LABELS_CSV")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            timezone,
            ingestion,
            tefas_base_url: env_or("FW_TEFAS_BASE_URL", DEFAULT_BASE_URL),
            fund_kind: env_or("FW_FUND_KIND", DEFAULT_FUND_KIND),
            labels_csv,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
