//! Configuration loading and representation.
//!
//! All settings come from environment variables and are read once at start-up.

use std::net::SocketAddr;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

use crate::address::viacep::DEFAULT_BASE_URL;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Postgres connection string; `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub address_lookup_url: Url,
    pub address_lookup_timeout: Duration,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid("BIND_ADDR", e.to_string()))?;

        let address_lookup_url = get("ADDRESS_LOOKUP_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let address_lookup_url = Url::parse(&address_lookup_url)
            .map_err(|e| ConfigError::invalid("ADDRESS_LOOKUP_URL", e.to_string()))?;
        if !matches!(address_lookup_url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                "ADDRESS_LOOKUP_URL",
                "scheme must be http or https",
            ));
        }

        let timeout_secs = match get("ADDRESS_LOOKUP_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::invalid("ADDRESS_LOOKUP_TIMEOUT_SECS", e.to_string()))?,
            None => DEFAULT_LOOKUP_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "ADDRESS_LOOKUP_TIMEOUT_SECS",
                "must be greater than zero",
            ));
        }

        Ok(Self {
            bind_addr,
            database_url: get("DATABASE_URL"),
            address_lookup_url,
            address_lookup_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
