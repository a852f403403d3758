//! HTTP API route definitions.

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::docs::ApiDoc;
use super::handlers::{
    active_hosts, all_host_tags, get_downtimes, health, host_tags, list_events, list_hosts,
    list_monitors, list_services, metrics, monitor_by_id, monitor_ids, monitor_pages,
    triggered_monitors, AppState,
};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health))
        // Downtimes
        .route("/v1/downtimes", get(get_downtimes))
        // Monitors
        .route("/v1/monitors", get(list_monitors))
        .route("/v1/monitors/ids", get(monitor_ids))
        .route("/v1/monitors/pages", get(monitor_pages))
        .route("/v1/monitors/triggered", get(triggered_monitors))
        .route("/v1/monitors/:id", get(monitor_by_id))
        // Hosts
        .route("/v1/hosts", get(list_hosts))
        .route("/v1/hosts/active", get(active_hosts))
        .route("/v1/hosts/tags", get(all_host_tags))
        .route("/v1/hosts/:hostname/tags", get(host_tags))
        // Events and service catalog
        .route("/v1/events", get(list_events))
        .route("/v1/services", get(list_services))
        // Metrics
        .route("/metrics", get(metrics))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::upstream::UpstreamClient;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        let client = UpstreamClient::new(&Config::default()).unwrap();
        create_router(AppState::new(client))
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn non_numeric_monitor_id_returns_400_envelope() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/v1/monitors/not-a-number")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let envelope: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(envelope["status"], 400);
        assert_eq!(envelope["message"], "invalid request: invalid monitor id: not-a-number");
    }

    #[tokio::test]
    async fn undecodable_path_returns_400_envelope() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/v1/monitors/%FF")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let envelope: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(envelope["status"], 400);
        assert!(envelope["message"]
            .as_str()
            .unwrap()
            .starts_with("invalid request: "));
    }

    #[tokio::test]
    async fn undecodable_host_name_returns_400_envelope() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/v1/hosts/%FF/tags")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let envelope: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(envelope["status"], 400);
    }

    #[tokio::test]
    async fn metrics_disabled_returns_404_envelope() {
        let response = app()
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let envelope: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(envelope["status"], 404);
        assert_eq!(envelope["message"], "metrics are disabled");
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
