use crate::datasource::yahoo::{DEFAULT_BASE_URL, DEFAULT_COOKIE_URL};
use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub bind_addr: IpAddr,
    pub fundamentals_api_url: String,
    /// Page that issues the session cookie the provider's crumb is bound to.
    pub fundamentals_cookie_url: String,
    /// Upper bound on a single ticker lookup, retries included.
    pub provider_timeout: Duration,
    /// Time the HTTP provider may spend retrying transient failures.
    pub provider_retry_budget: Duration,
    pub provider_user_agent: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let bind_addr = env_map
            .get("BIND_ADDR")
            .map(|s| s.as_str())
            .unwrap_or("127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "BIND_ADDR".to_string(),
                    "must be an IPv4 or IPv6 address".to_string(),
                )
            })?;

        let fundamentals_api_url = http_url(&env_map, "FUNDAMENTALS_API_URL", DEFAULT_BASE_URL)?;
        let fundamentals_cookie_url =
            http_url(&env_map, "FUNDAMENTALS_COOKIE_URL", DEFAULT_COOKIE_URL)?;

        let provider_timeout_ms = parse_ms(&env_map, "PROVIDER_TIMEOUT_MS", "10000")?;
        if provider_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "PROVIDER_TIMEOUT_MS".to_string(),
                "must be greater than 0".to_string(),
            ));
        }
        let provider_retry_budget_ms = parse_ms(&env_map, "PROVIDER_RETRY_BUDGET_MS", "3000")?;

        let provider_user_agent = env_map
            .get("PROVIDER_USER_AGENT")
            .cloned()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| {
                format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
            });

        Ok(Config {
            port,
            bind_addr,
            fundamentals_api_url,
            fundamentals_cookie_url,
            provider_timeout: Duration::from_millis(provider_timeout_ms),
            provider_retry_budget: Duration::from_millis(provider_retry_budget_ms),
            provider_user_agent,
        })
    }
}

fn http_url(
    env_map: &HashMap<String, String>,
    key: &str,
    default: &str,
) -> Result<String, ConfigError> {
    let url = env_map
        .get(key)
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| default.to_string());
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::InvalidValue(
            key.to_string(),
            format!("must be an http(s) URL, got {}", url),
        ));
    }
    Ok(url)
}

fn parse_ms(
    env_map: &HashMap<String, String>,
    key: &str,
    default: &str,
) -> Result<u64, ConfigError> {
    env_map
        .get(key)
        .map(|s| s.as_str())
        .unwrap_or(default)
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidValue(key.to_string(), "must be a valid u64".to_string()))
}
