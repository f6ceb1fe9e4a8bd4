use std::str::FromStr;
use std::time::Duration;

use dotenv::dotenv;
use log::{info, warn};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CricketProvider {
    CricApi,
    SportMonks,
}

impl FromStr for CricketProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cricapi" => Ok(CricketProvider::CricApi),
            "sportmonks" => Ok(CricketProvider::SportMonks),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_ca_file: Option<String>,
    pub server_host: String,
    pub server_port: u16,
    pub cricapi_key: String,
    pub cricket_provider: CricketProvider,
    pub sportmonks_api_key: String,
    pub sportsdb_api_key: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub http_timeout: Duration,
    pub sync_interval: Duration,
    pub cleanup_interval: Duration,
    pub lookahead_days: i64,
    pub max_matches_per_sport: usize,
}

const MIN_HTTP_TIMEOUT_SECS: u64 = 15;
const MAX_HTTP_TIMEOUT_SECS: u64 = 30;

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parsed_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value }),
        _ => Ok(default),
    }
}

impl Config {
    pub fn init() -> Result<Config, ConfigError> {
        dotenv().ok();
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let database_ca_file = std::env::var("DATABASE_CA_FILE")
            .ok()
            .filter(|path| !path.trim().is_empty());

        let cricket_provider = var_or("CRICKET_FIXTURE_PROVIDER", "cricapi");
        let cricket_provider = cricket_provider
            .parse::<CricketProvider>()
            .map_err(|value| ConfigError::Invalid {
                name: "CRICKET_FIXTURE_PROVIDER",
                value,
            })?;

        let timeout_secs = parsed_or("HTTP_TIMEOUT_SECS", MIN_HTTP_TIMEOUT_SECS)?
            .clamp(MIN_HTTP_TIMEOUT_SECS, MAX_HTTP_TIMEOUT_SECS);
        let sync_hours: u64 = parsed_or("SYNC_INTERVAL_HOURS", 6)?;
        let cleanup_hours: u64 = parsed_or("CLEANUP_INTERVAL_HOURS", 2)?;

        Ok(Config {
            database_url,
            database_ca_file,
            server_host: var_or("SERVER_HOST", "127.0.0.1"),
            server_port: parsed_or("SERVER_PORT", 8080)?,
            cricapi_key: var_or("CRICAPI_KEY", ""),
            cricket_provider,
            sportmonks_api_key: var_or("SPORTMONKS_API_KEY", ""),
            sportsdb_api_key: var_or("SPORTSDB_API_KEY", "3"),
            gemini_api_key: var_or("GEMINI_API_KEY", ""),
            gemini_model: var_or("GEMINI_MODEL", "gemini-2.5-pro"),
            http_timeout: Duration::from_secs(timeout_secs),
            sync_interval: Duration::from_secs(sync_hours.max(1) * 3600),
            cleanup_interval: Duration::from_secs(cleanup_hours.max(1) * 3600),
            lookahead_days: parsed_or("FIXTURE_LOOKAHEAD_DAYS", 7)?,
            max_matches_per_sport: parsed_or("MAX_MATCHES_PER_SPORT", 6)?,
        })
    }

    /// Log what is missing. Missing keys only disable the feature that needs them.
    pub fn validate(&self) {
        match self.cricket_provider {
            CricketProvider::CricApi if self.cricapi_key.is_empty() => {
                warn!("CRICAPI_KEY is not set, cricket fixtures will not be fetched")
            }
            CricketProvider::SportMonks if self.sportmonks_api_key.is_empty() => {
                warn!("SPORTMONKS_API_KEY is not set, cricket fixtures will not be fetched")
            }
            _ => {}
        }
        if self.sportmonks_api_key.is_empty() {
            warn!("SPORTMONKS_API_KEY is not set, rosters will skip the lineup lookup");
        }
        if self.gemini_api_key.is_empty() {
            warn!("GEMINI_API_KEY is not set, rosters will fall back to placeholder players");
        } else {
            info!("Generative roster fallback configured with model {}", self.gemini_model);
        }
    }
}
