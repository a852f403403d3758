//! Upstream endpoint paths, relative to the configured base URL.

/// Downtime listing.
pub const DOWNTIMES: &str = "api/v2/downtime";

/// Monitor search, paginated with `page` and `per_page`.
pub const MONITOR_SEARCH: &str = "api/v1/monitor/search";

/// Host listing.
pub const HOSTS: &str = "api/v1/hosts";

/// Active and up host totals.
pub const HOST_TOTALS: &str = "api/v1/hosts/totals";

/// Host tags; a host name segment selects one host.
pub const HOST_TAGS: &str = "api/v1/tags/hosts";

/// Event stream.
pub const EVENTS: &str = "api/v2/events";

/// Service catalog definitions.
pub const SERVICE_DEFINITIONS: &str = "api/v2/services/definitions";

/// Single monitor by numeric id.
pub fn monitor_by_id(id: i64) -> String {
    format!("api/v1/monitor/{}", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monitor_by_id_formats_path() {
        assert_eq!(monitor_by_id(42), "api/v1/monitor/42");
    }
}
