//! Application configuration loaded from environment variables.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Datadog Credentials ===
    /// API key sent as `DD-API-KEY`.
    #[serde(default)]
    pub dd_api_key: Option<String>,

    /// Application key sent as `DD-APPLICATION-KEY`.
    #[serde(default)]
    pub dd_app_key: Option<String>,

    /// Upstream API base URL.
    #[serde(default = "default_base_url")]
    pub dd_base_url: String,

    // === HTTP Client ===
    /// Outbound request timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    /// Idle connections kept per upstream host.
    #[serde(default = "default_http_pool_size")]
    pub http_pool_size: usize,

    // === Server Configuration ===
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Expose Prometheus metrics at `/metrics`.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_base_url() -> String {
    "https://api.ddog-gov.com".to_string()
}

fn default_http_timeout_ms() -> u64 {
    30_000
}

fn default_http_pool_size() -> usize {
    10
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dd_api_key: None,
            dd_app_key: None,
            dd_base_url: default_base_url(),
            http_timeout_ms: default_http_timeout_ms(),
            http_pool_size: default_http_pool_size(),
            port: default_port(),
            metrics_enabled: default_true(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        let base = Url::parse(&self.dd_base_url)
            .map_err(|e| format!("DD_BASE_URL is not a valid URL: {}", e))?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(format!(
                "DD_BASE_URL must use http or https, got {}",
                base.scheme()
            ));
        }

        if self.http_timeout_ms == 0 {
            return Err("HTTP_TIMEOUT_MS must be greater than 0".to_string());
        }

        if self.http_pool_size == 0 {
            return Err("HTTP_POOL_SIZE must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Whether both Datadog keys are present.
    pub fn has_credentials(&self) -> bool {
        self.dd_api_key.is_some() && self.dd_app_key.is_some()
    }

    /// Outbound request timeout.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }
}
