use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::time::Duration;

/// Typed application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db_path: String,
    pub initial_cash: Decimal,
    pub round_duration: Duration,
    pub tick_interval: Duration,
    pub organizer_secret: String,
    pub news_upstream_url: Option<String>,
    pub news_cache: Duration,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = env_or("PORT", "8000")
            .parse()
            .context("PORT must be a valid port number")?;

        let db_path = env_or("DB_PATH", "market.db");

        let initial_cash: Decimal = env_or("INITIAL_CASH", "100000")
            .parse()
            .context("INITIAL_CASH must be a decimal number")?;

        let round_duration_seconds: u64 = env_or("ROUND_DURATION_SECONDS", "1800")
            .parse()
            .context("ROUND_DURATION_SECONDS must be an integer")?;

        let tick_interval_ms: u64 = env_or("TICK_INTERVAL_MS", "2000")
            .parse()
            .context("TICK_INTERVAL_MS must be an integer")?;

        let organizer_secret = std::env::var("ORGANIZER_SECRET")
            .context("ORGANIZER_SECRET must be set (required to gate /round/* endpoints)")?;

        let news_upstream_url = std::env::var("NEWS_UPSTREAM_URL").ok();

        let news_cache_seconds: u64 = env_or("NEWS_CACHE_SECONDS", "300")
            .parse()
            .context("NEWS_CACHE_SECONDS must be an integer")?;

        let request_timeout_ms: u64 = env_or("REQUEST_TIMEOUT_MS", "4000")
            .parse()
            .context("REQUEST_TIMEOUT_MS must be an integer")?;

        Ok(Self {
            port,
            db_path,
            initial_cash,
            round_duration: Duration::from_secs(round_duration_seconds),
            tick_interval: Duration::from_millis(tick_interval_ms),
            organizer_secret,
            news_upstream_url,
            news_cache: Duration::from_secs(news_cache_seconds),
            request_timeout: Duration::from_millis(request_timeout_ms),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
