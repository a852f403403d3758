//! Shared utilities for pipeline tests.

use std::net::SocketAddr;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use ddog_gateway::api::{create_router, AppState};
use ddog_gateway::config::Config;
use ddog_gateway::upstream::UpstreamClient;
use tokio::net::TcpListener;
use tower::ServiceExt;

/// Start a mock upstream API serving `router` on an ephemeral port.
pub async fn start_mock_upstream(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    addr
}

/// Reserve an address with nothing listening on it.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Config pointing at `addr` with test credentials.
pub fn config_for(addr: SocketAddr) -> Config {
    Config {
        dd_api_key: Some("test-api-key".to_string()),
        dd_app_key: Some("test-app-key".to_string()),
        dd_base_url: format!("http://{}", addr),
        http_timeout_ms: 2_000,
        ..Config::default()
    }
}

/// Gateway router talking to the upstream at `addr`.
pub fn gateway(addr: SocketAddr) -> Router {
    let client = UpstreamClient::new(&config_for(addr)).unwrap();
    create_router(AppState::new(client))
}

/// Send a GET through the gateway and return status plus parsed JSON body.
pub async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body)
        .unwrap_or_else(|e| panic!("body is not JSON ({}): {:?}", e, body));
    (status, json)
}
