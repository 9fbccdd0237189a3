use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://ethanolivertroy.github.io/NIST-CMVP-API/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const API_URL_ENV: &str = "CMVP_API_URL";
const TIMEOUT_ENV: &str = "CMVP_TIMEOUT_SECS";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Values given on the command line; they win over the environment.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub timeout_secs: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API URL (expected http:// or https://): {0}")]
    InvalidUrl(String),

    #[error("invalid timeout (expected a positive number of seconds): {0}")]
    InvalidTimeout(String),
}

pub fn resolve_api_config(overrides: &ConfigOverrides) -> Result<ApiConfig, ConfigError> {
    resolve_api_config_with(overrides, |name| std::env::var(name).ok())
}

pub fn resolve_api_config_with(
    overrides: &ConfigOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ApiConfig, ConfigError> {
    let base_url = match non_empty(overrides.api_url.clone()).or_else(|| non_empty(env(API_URL_ENV)))
    {
        Some(url) => parse_base_url(&url)?,
        None => DEFAULT_API_URL.to_string(),
    };

    let timeout =
        match non_empty(overrides.timeout_secs.clone()).or_else(|| non_empty(env(TIMEOUT_ENV))) {
            Some(value) => parse_timeout(&value)?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

    Ok(ApiConfig { base_url, timeout })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn parse_base_url(value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    let has_scheme = trimmed.starts_with("http://") || trimmed.starts_with("https://");
    let has_host = trimmed
        .split_once("://")
        .is_some_and(|(_, rest)| !rest.is_empty());
    if !has_scheme || !has_host {
        return Err(ConfigError::InvalidUrl(value.to_string()));
    }
    Ok(trimmed.to_string())
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(value.to_string())),
    }
}
