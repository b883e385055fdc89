use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::fetcher::DEFAULT_POWER_URL;

/// Sweeps must run at least this often to bound memory held by expired entries
const MAX_SWEEP_INTERVAL_SECS: u64 = 300;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub power_url: String,
    pub request_timeout_secs: u64,
    pub provider_max_retries: usize,
    pub cache_sweep_interval_secs: u64,
    pub cache_max_entries: Option<usize>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: parse_or("SERVER_PORT", 5000)?,
            power_url: env::var("NASA_POWER_URL").unwrap_or_else(|_| DEFAULT_POWER_URL.to_string()),
            request_timeout_secs: parse_or("REQUEST_TIMEOUT_SECONDS", 30)?,
            provider_max_retries: parse_or("PROVIDER_MAX_RETRIES", 0)?,
            cache_sweep_interval_secs: parse_or::<u64>("CACHE_SWEEP_INTERVAL_SECONDS", 60)?
                .clamp(1, MAX_SWEEP_INTERVAL_SECS),
            cache_max_entries: parse_optional("CACHE_MAX_ENTRIES")?,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_or<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    Ok(parse_optional(var)?.unwrap_or(default))
}

fn parse_optional<T: FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value }),
        Err(_) => Ok(None),
    }
}
