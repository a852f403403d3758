//! Prometheus metrics for upstream calls and gateway responses.
//!
//! This module provides:
//! - Upstream request latency per resource
//! - Upstream request and failure counters
//! - Response counters by status code

use std::time::Instant;

use axum::http::StatusCode;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

use crate::resources::ResourceKind;

// === Metric Name Constants ===

/// Upstream request latency metric name.
pub const METRIC_UPSTREAM_LATENCY: &str = "upstream_request_latency_ms";
/// Upstream requests counter metric name.
pub const METRIC_UPSTREAM_REQUESTS: &str = "upstream_requests_total";
/// Upstream failures counter metric name.
pub const METRIC_UPSTREAM_FAILURES: &str = "upstream_failures_total";
/// Gateway responses counter metric name.
pub const METRIC_RESPONSES: &str = "responses_total";

/// Initialize all metric descriptions.
/// Call this once at startup, after a recorder is installed.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_UPSTREAM_LATENCY,
        "Upstream API request latency in milliseconds"
    );
    describe_counter!(
        METRIC_UPSTREAM_REQUESTS,
        "Total number of upstream API requests issued"
    );
    describe_counter!(
        METRIC_UPSTREAM_FAILURES,
        "Total number of upstream API requests that failed, by kind"
    );
    describe_counter!(
        METRIC_RESPONSES,
        "Total number of gateway responses, by status code"
    );

    debug!("Metrics initialized");
}

/// Install the global Prometheus recorder and return its render handle.
pub fn install_prometheus() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Increment upstream requests counter.
pub fn inc_upstream_requests(resource: ResourceKind) {
    let resource: &'static str = resource.into();
    counter!(METRIC_UPSTREAM_REQUESTS, "resource" => resource).increment(1);
}

/// Increment upstream failures counter.
pub fn inc_upstream_failures(resource: ResourceKind, kind: &'static str) {
    let resource: &'static str = resource.into();
    counter!(METRIC_UPSTREAM_FAILURES, "resource" => resource, "kind" => kind).increment(1);
}

/// Increment responses counter.
pub fn inc_responses(status: StatusCode) {
    counter!(METRIC_RESPONSES, "status" => status.as_u16().to_string()).increment(1);
}

/// RAII guard for timing upstream calls.
/// Records latency when dropped, so cancelled calls are measured too.
pub struct UpstreamTimer {
    start: Instant,
    resource: ResourceKind,
}

impl UpstreamTimer {
    /// Start timing a call for the given resource.
    pub fn new(resource: ResourceKind) -> Self {
        Self {
            start: Instant::now(),
            resource,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for UpstreamTimer {
    fn drop(&mut self) {
        let resource: &'static str = self.resource.into();
        histogram!(METRIC_UPSTREAM_LATENCY, "resource" => resource).record(self.elapsed_ms());
    }
}
