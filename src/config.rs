use reqwest::Url;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Backend address used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const API_URL_ENV: &str = "DASHBOARD_API_URL";
pub const REQUEST_TIMEOUT_ENV: &str = "DASHBOARD_REQUEST_TIMEOUT_SECS";

pub const POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid backend URL {value:?}: {reason}")]
    InvalidUrl { value: String, reason: String },
    #[error("invalid request timeout {0:?}, expected a positive number of seconds")]
    InvalidTimeout(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL for `/api/resources`.
    pub api_url: String,
    /// Base URL for `/api/login`. Not read from the environment.
    pub login_url: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            login_url: DEFAULT_API_URL.to_string(),
            poll_interval: POLL_INTERVAL,
            request_timeout: REQUEST_TIMEOUT,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from `lookup`. Values that fail to parse are
    /// reported and replaced by their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            match parse_base_url(&raw) {
                Ok(url) => config.api_url = url,
                Err(err) => warn!(%err, "ignoring {}", API_URL_ENV),
            }
        }

        if let Some(raw) = lookup(REQUEST_TIMEOUT_ENV).filter(|v| !v.trim().is_empty()) {
            match parse_timeout(&raw) {
                Ok(timeout) => config.request_timeout = timeout,
                Err(err) => warn!(%err, "ignoring {}", REQUEST_TIMEOUT_ENV),
            }
        }

        config
    }
}

/// Validates an http(s) base URL and strips trailing slashes so endpoint
/// paths can be appended directly.
pub fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|e| ConfigError::InvalidUrl {
        value: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl {
            value: raw.to_string(),
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

pub fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}
