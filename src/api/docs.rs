//! OpenAPI document for the gateway routes.

use utoipa::OpenApi;

use super::handlers;

/// Generated OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(title = "ddog-gateway", description = "Flattened views over the Datadog API"),
    paths(
        handlers::health,
        handlers::get_downtimes,
        handlers::list_monitors,
        handlers::monitor_ids,
        handlers::monitor_pages,
        handlers::triggered_monitors,
        handlers::monitor_by_id,
        handlers::list_hosts,
        handlers::active_hosts,
        handlers::all_host_tags,
        handlers::host_tags,
        handlers::list_events,
        handlers::list_services,
    ),
    tags(
        (name = "health", description = "Liveness"),
        (name = "downtimes", description = "Scheduled downtimes"),
        (name = "monitors", description = "Monitor definitions and states"),
        (name = "hosts", description = "Reporting hosts and their tags"),
        (name = "events", description = "Event stream"),
        (name = "services", description = "Service catalog"),
    )
)]
pub struct ApiDoc;
