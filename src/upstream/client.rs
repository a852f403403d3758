//! Typed Datadog API client.

use axum::body::Bytes;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::Config;
use crate::error::{GatewayError, InitError};
use crate::metrics;
use crate::resources::ResourceKind;

const API_KEY_HEADER: &str = "DD-API-KEY";
const APP_KEY_HEADER: &str = "DD-APPLICATION-KEY";

/// Longest upstream error body echoed into debug logs.
const MAX_LOGGED_BODY: usize = 512;

/// A decoded upstream payload together with the bytes it was decoded from.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    /// Decoded value.
    pub value: T,
    /// Raw response body, kept for diagnostics.
    pub raw: Bytes,
}

/// Datadog API client.
///
/// Cloning is cheap: the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Base URL every endpoint path is appended to.
    base_url: Url,
    /// API key, if configured.
    api_key: Option<String>,
    /// Application key, if configured.
    app_key: Option<String>,
}

impl UpstreamClient {
    /// Create a new client from config.
    pub fn new(config: &Config) -> Result<Self, InitError> {
        let base_url = Url::parse(&config.dd_base_url)?;

        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .connect_timeout(std::time::Duration::from_secs(10))
            .tcp_keepalive(std::time::Duration::from_secs(30))
            .pool_max_idle_per_host(config.http_pool_size)
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_key: config.dd_api_key.clone(),
            app_key: config.dd_app_key.clone(),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint path against the base URL.
    pub fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}/{}", prefix, path.trim_start_matches('/')));
        url
    }

    /// Resolve an endpoint path followed by one percent-encoded segment.
    pub fn endpoint_segment(&self, path: &str, segment: &str) -> Url {
        let mut url = self.endpoint(path);
        // Only cannot-be-a-base URLs refuse segments; the base is http(s).
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(segment);
        }
        url
    }

    /// Issue one GET to `url` and decode the JSON body as `T`.
    ///
    /// Non-2xx statuses are reported before any decoding is attempted. No
    /// retries are made. Dropping the returned future aborts the request.
    #[instrument(skip_all, fields(resource = %resource, url = %url))]
    pub async fn get_json<T>(
        &self,
        resource: ResourceKind,
        url: Url,
    ) -> Result<Fetched<T>, GatewayError>
    where
        T: DeserializeOwned,
    {
        metrics::inc_upstream_requests(resource);
        let _timer = metrics::UpstreamTimer::new(resource);

        let result = self.fetch(url).await;
        if let Err(e) = &result {
            warn!(kind = e.kind(), error = %e, "Upstream request failed");
            metrics::inc_upstream_failures(resource, e.kind());
        }
        result
    }

    async fn fetch<T>(&self, url: Url) -> Result<Fetched<T>, GatewayError>
    where
        T: DeserializeOwned,
    {
        let mut request = self.http.get(url).header(ACCEPT, "application/json");
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }
        if let Some(key) = &self.app_key {
            request = request.header(APP_KEY_HEADER, key);
        }

        let response = request
            .send()
            .await
            .map_err(GatewayError::UpstreamUnreachable)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(
                status = status.as_u16(),
                body = %truncate(&body, MAX_LOGGED_BODY),
                "Upstream returned error status"
            );
            return Err(GatewayError::UpstreamRejected {
                status: status.as_u16(),
            });
        }

        let raw = response
            .bytes()
            .await
            .map_err(GatewayError::UpstreamUnreachable)?;

        let value = serde_json::from_slice(&raw).map_err(GatewayError::DecodeFailed)?;

        debug!(bytes = raw.len(), "Decoded upstream payload");

        Ok(Fetched { value, raw })
    }
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
