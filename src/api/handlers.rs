//! HTTP API handlers.
//!
//! Each handler runs one aggregation and returns a single response: the
//! serialized output on success, or the error envelope. Errors return early
//! through `?`, so a request can never be answered twice.

use std::sync::Arc;

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use utoipa::ToSchema;

use super::response::{write_json, ErrorEnvelope};
use crate::error::GatewayError;
use crate::resources::hosts::{self, HostTags, HostTotals};
use crate::resources::monitors::{
    self, Metadata, Monitor, MonitorIdsResponse, MonitorListResponse, PageQuery, Pagination,
    TriggeredMonitorsResponse,
};
use crate::resources::services::{self, ServiceList};
use crate::resources::{downtimes, events, DowntimeSummary};
use crate::upstream::UpstreamClient;

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Upstream API client.
    pub client: Arc<UpstreamClient>,
    /// Prometheus render handle, when metrics are enabled.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state without a metrics endpoint.
    pub fn new(client: UpstreamClient) -> Self {
        Self {
            client: Arc::new(client),
            metrics: None,
        }
    }

    /// Attach a Prometheus handle to serve `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: String,
}

type HandlerResult = Result<Response, GatewayError>;

/// Health check handler - always returns 200.
#[utoipa::path(get, path = "/health", tag = "health",
    responses((status = 200, description = "Service is up", body = HealthResponse)))]
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Monitor ids and scopes of all downtimes.
#[utoipa::path(get, path = "/v1/downtimes", tag = "downtimes",
    responses(
        (status = 200, description = "Flattened downtimes", body = DowntimeSummary),
        (status = 500, description = "Upstream or decode failure", body = ErrorEnvelope),
    ))]
pub async fn get_downtimes(State(state): State<AppState>) -> HandlerResult {
    let summary = downtimes::summarize(&state.client).await?;
    Ok(write_json(StatusCode::OK, &summary))
}

/// One page of monitors.
#[utoipa::path(get, path = "/v1/monitors", tag = "monitors", params(PageQuery),
    responses(
        (status = 200, description = "Monitor page", body = MonitorListResponse),
        (status = 500, description = "Upstream or decode failure", body = ErrorEnvelope),
    ))]
pub async fn list_monitors(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> HandlerResult {
    let query = PageQuery::from_raw(raw.as_deref());
    let list = monitors::list(&state.client, Pagination::from_query(&query)).await?;
    Ok(write_json(StatusCode::OK, &list))
}

/// Monitor ids, names, and statuses.
#[utoipa::path(get, path = "/v1/monitors/ids", tag = "monitors",
    responses(
        (status = 200, description = "Monitor ids", body = MonitorIdsResponse),
        (status = 500, description = "Upstream or decode failure", body = ErrorEnvelope),
    ))]
pub async fn monitor_ids(State(state): State<AppState>) -> HandlerResult {
    let ids = monitors::ids(&state.client).await?;
    Ok(write_json(StatusCode::OK, &ids))
}

/// Monitor search pagination metadata.
#[utoipa::path(get, path = "/v1/monitors/pages", tag = "monitors",
    responses(
        (status = 200, description = "Pagination metadata", body = Metadata),
        (status = 500, description = "Upstream or decode failure", body = ErrorEnvelope),
    ))]
pub async fn monitor_pages(State(state): State<AppState>) -> HandlerResult {
    let metadata = monitors::pages(&state.client).await?;
    Ok(write_json(StatusCode::OK, &metadata))
}

/// Monitors in `Alert` or `Warn` across all pages.
#[utoipa::path(get, path = "/v1/monitors/triggered", tag = "monitors",
    responses(
        (status = 200, description = "Triggered monitors", body = TriggeredMonitorsResponse),
        (status = 500, description = "Upstream or decode failure", body = ErrorEnvelope),
    ))]
pub async fn triggered_monitors(State(state): State<AppState>) -> HandlerResult {
    let triggered = monitors::triggered(&state.client).await?;
    Ok(write_json(StatusCode::OK, &triggered))
}

/// A single monitor.
#[utoipa::path(get, path = "/v1/monitors/{id}", tag = "monitors",
    params(("id" = String, Path, description = "Numeric monitor id")),
    responses(
        (status = 200, description = "Monitor", body = Monitor),
        (status = 400, description = "Id is not numeric", body = ErrorEnvelope),
        (status = 404, description = "Unknown monitor", body = ErrorEnvelope),
    ))]
pub async fn monitor_by_id(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> HandlerResult {
    let Path(id) = path?;
    let monitor = monitors::by_id(&state.client, &id).await?;
    Ok(write_json(StatusCode::OK, &monitor))
}

/// Names of all reporting hosts.
#[utoipa::path(get, path = "/v1/hosts", tag = "hosts",
    responses(
        (status = 200, description = "Host names", body = Vec<String>),
        (status = 500, description = "Upstream or decode failure", body = ErrorEnvelope),
    ))]
pub async fn list_hosts(State(state): State<AppState>) -> HandlerResult {
    let names = hosts::names(&state.client).await?;
    Ok(write_json(StatusCode::OK, &names))
}

/// Active and up host totals.
#[utoipa::path(get, path = "/v1/hosts/active", tag = "hosts",
    responses(
        (status = 200, description = "Host totals", body = HostTotals),
        (status = 500, description = "Upstream or decode failure", body = ErrorEnvelope),
    ))]
pub async fn active_hosts(State(state): State<AppState>) -> HandlerResult {
    let totals = hosts::totals(&state.client).await?;
    Ok(write_json(StatusCode::OK, &totals))
}

/// Tags of one host.
#[utoipa::path(get, path = "/v1/hosts/{hostname}/tags", tag = "hosts",
    params(("hostname" = String, Path, description = "Host name")),
    responses(
        (status = 200, description = "Host tags", body = HostTags),
        (status = 404, description = "Unknown host", body = ErrorEnvelope),
    ))]
pub async fn host_tags(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> HandlerResult {
    let Path(hostname) = path?;
    let tags = hosts::tags(&state.client, &hostname).await?;
    Ok(write_json(StatusCode::OK, &tags))
}

/// Tags of every host, keyed by host name.
#[utoipa::path(get, path = "/v1/hosts/tags", tag = "hosts",
    responses(
        (status = 200, description = "Tags by host; failed hosts carry one error entry",
            body = std::collections::BTreeMap<String, Vec<String>>),
        (status = 500, description = "Host listing failed", body = ErrorEnvelope),
    ))]
pub async fn all_host_tags(State(state): State<AppState>) -> HandlerResult {
    let tags = hosts::all_tags(&state.client).await?;
    Ok(write_json(StatusCode::OK, &tags))
}

/// Messages of recent events.
#[utoipa::path(get, path = "/v1/events", tag = "events",
    responses(
        (status = 200, description = "Event messages", body = Vec<String>),
        (status = 500, description = "Upstream or decode failure", body = ErrorEnvelope),
    ))]
pub async fn list_events(State(state): State<AppState>) -> HandlerResult {
    let messages = events::messages(&state.client).await?;
    Ok(write_json(StatusCode::OK, &messages))
}

/// Service catalog definitions.
#[utoipa::path(get, path = "/v1/services", tag = "services",
    responses(
        (status = 200, description = "Service definitions", body = ServiceList),
        (status = 500, description = "Upstream or decode failure", body = ErrorEnvelope),
    ))]
pub async fn list_services(State(state): State<AppState>) -> HandlerResult {
    let definitions = services::list(&state.client).await?;
    Ok(write_json(StatusCode::OK, &definitions))
}

/// Prometheus text exposition, or a 404 envelope when metrics are disabled.
pub async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorEnvelope {
                status: StatusCode::NOT_FOUND.as_u16(),
                message: "metrics are disabled".to_string(),
            }),
        )
            .into_response(),
    }
}
