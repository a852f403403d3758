//! JSON response writing and the error envelope.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::error::GatewayError;
use crate::metrics;

/// Body of every failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorEnvelope {
    /// HTTP status code, repeated in the body.
    pub status: u16,
    /// Human-readable failure description.
    pub message: String,
}

/// Serialize `value` and write it with `status`.
///
/// A serialization failure is reported as an `EncodeFailed` envelope instead.
pub fn write_json<T: Serialize>(status: StatusCode, value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(body) => {
            metrics::inc_responses(status);
            (
                status,
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                )],
                body,
            )
                .into_response()
        }
        Err(e) => GatewayError::EncodeFailed(e).into_response(),
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            error!(kind = self.kind(), status = status.as_u16(), error = %message, "Request failed");
        } else {
            warn!(kind = self.kind(), status = status.as_u16(), error = %message, "Request rejected");
        }

        metrics::inc_responses(status);

        let envelope = ErrorEnvelope {
            status: status.as_u16(),
            message,
        };
        (status, Json(envelope)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use pretty_assertions::assert_eq;
    use serde::ser::Error as _;
    use serde::Serializer;

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cannot encode"))
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn write_json_sets_status_and_content_type() {
        let response = write_json(StatusCode::OK, &serde_json::json!({"ids": [1]}));

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            HeaderValue::from_static("application/json")
        );
        assert_eq!(body_json(response).await, serde_json::json!({"ids": [1]}));
    }

    #[tokio::test]
    async fn encode_failure_becomes_envelope() {
        let response = write_json(StatusCode::OK, &Unencodable);

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["status"], 500);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("failed to encode response"));
    }

    #[tokio::test]
    async fn rejected_status_is_written_into_envelope() {
        let response = GatewayError::UpstreamRejected { status: 503 }.into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let envelope: ErrorEnvelope =
            serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(
            envelope,
            ErrorEnvelope {
                status: 503,
                message: "upstream rejected request with HTTP 503".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn invalid_request_envelope_is_400() {
        let response = GatewayError::InvalidRequest("invalid monitor id: x".to_string())
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["status"], 400);
    }
}
