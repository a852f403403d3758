//! Unified error types for the gateway.

use axum::extract::rejection::PathRejection;
use axum::http::StatusCode;
use strum::IntoStaticStr;
use thiserror::Error;

/// Failure of a single gateway request, from any stage of the pipeline.
///
/// Every variant is terminal for the request it occurred in: it is turned
/// into exactly one error envelope by [`crate::api::response`].
#[derive(Error, Debug, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum GatewayError {
    /// Transport-level failure talking to the upstream API.
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(#[source] reqwest::Error),

    /// The upstream API answered with a non-2xx status.
    #[error("upstream rejected request with HTTP {status}")]
    UpstreamRejected {
        /// Status code returned by the upstream API.
        status: u16,
    },

    /// The upstream body did not match the expected resource shape.
    #[error("failed to decode upstream response: {0}")]
    DecodeFailed(#[source] serde_json::Error),

    /// The aggregated output could not be serialized.
    #[error("failed to encode response: {0}")]
    EncodeFailed(#[source] serde_json::Error),

    /// Caller supplied an unusable path or query value.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl GatewayError {
    /// HTTP status the caller receives for this error.
    ///
    /// Upstream rejections keep their status when it is a client or server
    /// error; any other upstream status is reported as 500.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UpstreamRejected { status } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamUnreachable(_) | Self::DecodeFailed(_) | Self::EncodeFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

impl From<PathRejection> for GatewayError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

/// Errors raised while building the upstream client at startup.
#[derive(Error, Debug)]
pub enum InitError {
    /// The configured base URL is not a valid URL.
    #[error("invalid upstream base url: {0}")]
    BaseUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_error() -> serde_json::Error {
        serde_json::from_str::<u32>("not json").unwrap_err()
    }

    #[test]
    fn upstream_error_statuses_are_propagated() {
        for status in [400, 401, 404, 429, 500, 502, 503, 599] {
            let err = GatewayError::UpstreamRejected { status };
            assert_eq!(err.status_code().as_u16(), status);
        }
    }

    #[test]
    fn non_error_upstream_statuses_become_500() {
        for status in [100, 204, 302, 304, 399] {
            let err = GatewayError::UpstreamRejected { status };
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn internal_failures_map_to_500() {
        assert_eq!(
            GatewayError::DecodeFailed(decode_error()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            GatewayError::EncodeFailed(decode_error()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn invalid_request_maps_to_400() {
        let err = GatewayError::InvalidRequest("bad id".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn kind_labels_are_snake_case() {
        assert_eq!(
            GatewayError::UpstreamRejected { status: 503 }.kind(),
            "upstream_rejected"
        );
        assert_eq!(GatewayError::DecodeFailed(decode_error()).kind(), "decode_failed");
    }

    #[test]
    fn decode_message_names_the_stage() {
        let err = GatewayError::DecodeFailed(decode_error());
        assert!(err.to_string().starts_with("failed to decode upstream response"));
    }
}
