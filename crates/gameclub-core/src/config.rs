//! Client configuration loaded from the environment.
//!
//! | Env Var | Default | Meaning |
//! |---------|---------|---------|
//! | `GAMECLUB_API_URL` | `http://localhost:3000/api` | Base address of the REST API |
//! | `GAMECLUB_MAX_ATTEMPTS` | `3` | Total attempts per call |
//! | `GAMECLUB_BACKOFF` | `linear` | Backoff family: `linear`, `fixed` or `exponential` |
//! | `GAMECLUB_BACKOFF_MS` | `1000` | Backoff unit in milliseconds |
//! | `GAMECLUB_TIMEOUT_MS` | `10000` | Per-request transport timeout |

use std::env;
use std::time::Duration;

use crate::error::ConfigError;
use crate::executor::DEFAULT_TIMEOUT_MS;
use crate::retry::{BackoffKind, RetryConfig};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

pub const ENV_BASE_URL: &str = "GAMECLUB_API_URL";
pub const ENV_MAX_ATTEMPTS: &str = "GAMECLUB_MAX_ATTEMPTS";
pub const ENV_BACKOFF: &str = "GAMECLUB_BACKOFF";
pub const ENV_BACKOFF_MS: &str = "GAMECLUB_BACKOFF_MS";
pub const ENV_TIMEOUT_MS: &str = "GAMECLUB_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub max_attempts: u32,
    pub backoff: BackoffKind,
    pub backoff_unit: Duration,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            max_attempts: 3,
            backoff: BackoffKind::Linear,
            backoff_unit: Duration::from_secs(1),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl ClientConfig {
    /// Reads the process environment, falling back to defaults for unset keys.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_url = match lookup(ENV_BASE_URL) {
            Some(value) => validate_base_url(&value)?,
            None => defaults.base_url,
        };
        let max_attempts = match lookup(ENV_MAX_ATTEMPTS) {
            Some(value) => parse_number::<u32>(ENV_MAX_ATTEMPTS, &value)?,
            None => defaults.max_attempts,
        };
        let backoff = match lookup(ENV_BACKOFF) {
            Some(value) => value.parse::<BackoffKind>()?,
            None => defaults.backoff,
        };
        let backoff_unit = match lookup(ENV_BACKOFF_MS) {
            Some(value) => Duration::from_millis(parse_number(ENV_BACKOFF_MS, &value)?),
            None => defaults.backoff_unit,
        };
        let timeout = match lookup(ENV_TIMEOUT_MS) {
            Some(value) => Duration::from_millis(parse_number(ENV_TIMEOUT_MS, &value)?),
            None => defaults.timeout,
        };

        Ok(Self {
            base_url,
            max_attempts,
            backoff,
            backoff_unit,
            timeout,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = validate_base_url(base_url)?;
        Ok(self)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(self.max_attempts, self.backoff.with_unit(self.backoff_unit))
    }

    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

fn validate_base_url(value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyBaseUrl);
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidBaseUrl {
            value: trimmed.to_owned(),
        });
    }
    Ok(trimmed.trim_end_matches('/').to_owned())
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber {
            name,
            value: value.to_owned(),
        })
}
