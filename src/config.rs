//! Runtime configuration for the hosted backend
//!
//! Values come from the process environment, with a `.env` file in the
//! working directory loaded first when present (copy `.env.example`).

use crate::utils::errors::ConfigError;
use std::time::Duration;

pub const ENV_URL: &str = "BACKEND_URL";
pub const ENV_ANON_KEY: &str = "BACKEND_ANON_KEY";
pub const ENV_ACCESS_TOKEN: &str = "BACKEND_ACCESS_TOKEN";
pub const ENV_REALTIME_URL: &str = "BACKEND_REALTIME_URL";
pub const ENV_TIMEOUT_SECS: &str = "BACKEND_TIMEOUT_SECS";

#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend, without trailing slash
    pub url: String,
    /// Public key sent as `apikey` on every request
    pub anon_key: String,
    /// Access token of the signed-in user, if any
    pub access_token: Option<String>,
    /// Server-sent event feed for favorites changes
    pub realtime_url: Option<String>,
    /// Total request timeout; unset leaves the transport's default
    pub timeout: Option<Duration>,
}

impl BackendConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            access_token: None,
            realtime_url: None,
            timeout: None,
        }
    }

    /// Load `.env` (if present) and read the configuration from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            log::debug!("[Config] No .env file loaded: {}", e);
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup (environment, test map)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let url = non_empty(ENV_URL).ok_or(ConfigError::Missing(ENV_URL))?;
        let anon_key = non_empty(ENV_ANON_KEY).ok_or(ConfigError::Missing(ENV_ANON_KEY))?;

        let mut config = Self::new(url, anon_key);
        config.access_token = non_empty(ENV_ACCESS_TOKEN);
        config.realtime_url = non_empty(ENV_REALTIME_URL);

        if let Some(raw) = non_empty(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: ENV_TIMEOUT_SECS,
                value: raw.clone(),
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// `{url}/rest/v1/{table}`
    pub fn table_url(&self, table: &str) -> String {
        format!("{}{}/{}", self.url, crate::constants::REST_PATH, table)
    }
}
