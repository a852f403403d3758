//! Monitors: search pages, id listings, triggered monitors, and lookups.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use url::Url;
use utoipa::{IntoParams, ToSchema};

use super::{aggregate, null_as_default, Resource, ResourceKind};
use crate::error::{GatewayError, Result};
use crate::upstream::{urls, UpstreamClient};

/// Default page size for monitor listings.
pub const DEFAULT_PER_PAGE: u32 = 30;

/// Largest page size accepted from callers and used when walking all pages.
pub const MAX_PER_PAGE: u32 = 100;

/// Most search pages walked when collecting triggered monitors.
pub const MAX_SEARCH_PAGES: u32 = 500;

/// Upstream states that count as triggered.
const TRIGGERED_STATES: [&str; 2] = ["Alert", "Warn"];

/// `GET /api/v1/monitor/search` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonitorSearchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub monitors: Vec<Monitor>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Metadata,
}

/// A Datadog monitor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Monitor {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub monitor_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub query: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub modified: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub creator: Creator,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overall_state: String,
}

impl Monitor {
    /// Whether the monitor is alerting or warning.
    pub fn is_triggered(&self) -> bool {
        TRIGGERED_STATES.contains(&self.status.as_str())
            || TRIGGERED_STATES.contains(&self.overall_state.as_str())
    }
}

/// Monitor author.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Creator {
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub handle: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// Search pagination metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Metadata {
    #[serde(default, deserialize_with = "null_as_default")]
    pub page: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub page_count: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub per_page: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_count: i64,
}

/// One page of monitors with its pagination metadata flattened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MonitorListResponse {
    pub monitors: Vec<Monitor>,
    pub page: i64,
    pub page_count: i64,
    pub per_page: i64,
    pub total_count: i64,
}

/// Identifying fields of a monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MonitorIdInfo {
    pub id: i64,
    pub name: String,
    pub status: String,
}

/// Monitor ids with a count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MonitorIdsResponse {
    pub monitors: Vec<MonitorIdInfo>,
    pub count: usize,
}

/// Monitors currently in `Alert` or `Warn`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TriggeredMonitorsResponse {
    pub monitors: Vec<Monitor>,
    pub count: usize,
}

/// Raw `page` and `per_page` query values.
///
/// Kept as strings so unparseable values fall back to defaults instead of
/// rejecting the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Zero-based page index.
    pub page: Option<String>,
    /// Page size, 1 to 100.
    pub per_page: Option<String>,
}

impl PageQuery {
    /// Read `page` and `per_page` from a raw query string.
    ///
    /// Repeated keys keep their first value; unrelated keys are ignored.
    pub fn from_raw(raw: Option<&str>) -> Self {
        let mut query = Self::default();

        for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            let slot = match key.as_ref() {
                "page" => &mut query.page,
                "per_page" => &mut query.per_page,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        query
    }
}

/// Validated monitor search pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 0,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Pagination {
    /// Apply caller query values, ignoring any that are out of range.
    pub fn from_query(query: &PageQuery) -> Self {
        let mut pagination = Self::default();

        if let Some(page) = query.page.as_deref().and_then(|p| p.parse::<u32>().ok()) {
            pagination.page = page;
        }

        if let Some(per_page) = query
            .per_page
            .as_deref()
            .and_then(|p| p.parse::<u32>().ok())
            .filter(|p| (1..=MAX_PER_PAGE).contains(p))
        {
            pagination.per_page = per_page;
        }

        pagination
    }
}

fn search_url(client: &UpstreamClient, pagination: Option<Pagination>) -> Url {
    let mut url = client.endpoint(urls::MONITOR_SEARCH);
    if let Some(p) = pagination {
        url.query_pairs_mut()
            .append_pair("page", &p.page.to_string())
            .append_pair("per_page", &p.per_page.to_string());
    }
    url
}

/// Monitor search page, flattened.
pub struct MonitorList;

impl Resource for MonitorList {
    const KIND: ResourceKind = ResourceKind::Monitors;
    type Shape = MonitorSearchResponse;
    type Output = MonitorListResponse;

    fn project(shape: MonitorSearchResponse) -> MonitorListResponse {
        MonitorListResponse {
            monitors: shape.monitors,
            page: shape.metadata.page,
            page_count: shape.metadata.page_count,
            per_page: shape.metadata.per_page,
            total_count: shape.metadata.total_count,
        }
    }
}

/// Monitor search reduced to id, name, and status.
pub struct MonitorIds;

impl Resource for MonitorIds {
    const KIND: ResourceKind = ResourceKind::Monitors;
    type Shape = MonitorSearchResponse;
    type Output = MonitorIdsResponse;

    fn project(shape: MonitorSearchResponse) -> MonitorIdsResponse {
        let monitors: Vec<_> = shape
            .monitors
            .into_iter()
            .map(|m| MonitorIdInfo {
                id: m.id,
                name: m.name,
                status: m.status,
            })
            .collect();

        MonitorIdsResponse {
            count: monitors.len(),
            monitors,
        }
    }
}

/// Monitor search pagination metadata only.
pub struct MonitorPages;

impl Resource for MonitorPages {
    const KIND: ResourceKind = ResourceKind::Monitors;
    type Shape = MonitorSearchResponse;
    type Output = Metadata;

    fn project(shape: MonitorSearchResponse) -> Metadata {
        shape.metadata
    }
}

/// Single monitor lookup.
pub struct MonitorDetail;

impl Resource for MonitorDetail {
    const KIND: ResourceKind = ResourceKind::Monitors;
    type Shape = Monitor;
    type Output = Monitor;

    fn project(shape: Monitor) -> Monitor {
        shape
    }
}

/// Fetch one page of monitors.
#[instrument(skip(client))]
pub async fn list(
    client: &UpstreamClient,
    pagination: Pagination,
) -> Result<MonitorListResponse> {
    aggregate::<MonitorList>(client, search_url(client, Some(pagination))).await
}

/// Fetch the first search page reduced to ids.
#[instrument(skip(client))]
pub async fn ids(client: &UpstreamClient) -> Result<MonitorIdsResponse> {
    aggregate::<MonitorIds>(client, search_url(client, None)).await
}

/// Fetch search pagination metadata.
#[instrument(skip(client))]
pub async fn pages(client: &UpstreamClient) -> Result<Metadata> {
    aggregate::<MonitorPages>(client, search_url(client, None)).await
}

/// Fetch one monitor by its id as given in the request path.
#[instrument(skip(client))]
pub async fn by_id(client: &UpstreamClient, raw_id: &str) -> Result<Monitor> {
    let id: i64 = raw_id
        .parse()
        .map_err(|_| GatewayError::InvalidRequest(format!("invalid monitor id: {}", raw_id)))?;

    aggregate::<MonitorDetail>(client, client.endpoint(&urls::monitor_by_id(id))).await
}

/// Walk every search page and keep monitors in `Alert` or `Warn`.
///
/// A failure on any page fails the whole call. The walk ends at the last
/// reported page, at the first empty page, or after [`MAX_SEARCH_PAGES`].
#[instrument(skip(client))]
pub async fn triggered(client: &UpstreamClient) -> Result<TriggeredMonitorsResponse> {
    let mut triggered = Vec::new();
    let mut page = 0u32;
    let mut scanned = 0usize;

    loop {
        let pagination = Pagination {
            page,
            per_page: MAX_PER_PAGE,
        };
        let fetched = client
            .get_json::<MonitorSearchResponse>(ResourceKind::Monitors, search_url(client, Some(pagination)))
            .await?;
        let response = fetched.value;
        let page_count = response.metadata.page_count;
        let exhausted = response.monitors.is_empty();

        scanned += response.monitors.len();
        triggered.extend(response.monitors.into_iter().filter(Monitor::is_triggered));

        debug!(page, page_count, "Scanned monitor page");

        if exhausted || i64::from(page) + 1 >= page_count {
            break;
        }
        page += 1;
        if page >= MAX_SEARCH_PAGES {
            warn!(page_count, "Monitor search exceeds page limit, stopping walk");
            break;
        }
    }

    info!(scanned, triggered = triggered.len(), "Collected triggered monitors");

    Ok(TriggeredMonitorsResponse {
        count: triggered.len(),
        monitors: triggered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SEARCH_BODY: &str = r#"{
        "monitors": [
            {"id": 1, "name": "cpu", "status": "OK", "type": "metric alert",
             "tags": ["team:core"], "creator": {"email": "a@b.c", "handle": "a", "name": "A"},
             "overall_state": "OK", "last_triggered_ts": null},
            {"id": 2, "name": "disk", "status": "Alert", "priority": 2},
            {"id": 3, "name": "mem", "status": "OK", "overall_state": "Warn"}
        ],
        "metadata": {"page": 0, "page_count": 1, "per_page": 30, "total_count": 3},
        "counts": {"status": []}
    }"#;

    fn search() -> MonitorSearchResponse {
        serde_json::from_str(SEARCH_BODY).unwrap()
    }

    fn query(page: Option<&str>, per_page: Option<&str>) -> PageQuery {
        PageQuery {
            page: page.map(str::to_string),
            per_page: per_page.map(str::to_string),
        }
    }

    #[test]
    fn pagination_defaults() {
        assert_eq!(
            Pagination::from_query(&PageQuery::default()),
            Pagination {
                page: 0,
                per_page: 30
            }
        );
    }

    #[test]
    fn pagination_accepts_valid_values() {
        let p = Pagination::from_query(&query(Some("4"), Some("100")));
        assert_eq!(p, Pagination { page: 4, per_page: 100 });
    }

    #[test]
    fn pagination_ignores_invalid_values() {
        for (page, per_page) in [("-1", "0"), ("abc", "101"), ("", "-5")] {
            let p = Pagination::from_query(&query(Some(page), Some(per_page)));
            assert_eq!(p, Pagination::default());
        }
    }

    #[test]
    fn raw_query_keeps_first_value() {
        assert_eq!(
            PageQuery::from_raw(Some("page=1&page=2&per_page=10&per_page=abc")),
            query(Some("1"), Some("10"))
        );
    }

    #[test]
    fn raw_query_ignores_unknown_and_missing() {
        assert_eq!(PageQuery::from_raw(None), PageQuery::default());
        assert_eq!(
            PageQuery::from_raw(Some("sort=name&per_page=%32%30")),
            query(None, Some("20"))
        );
    }

    #[test]
    fn list_flattens_metadata() {
        let list = MonitorList::project(search());
        assert_eq!(list.monitors.len(), 3);
        assert_eq!(list.page_count, 1);
        assert_eq!(list.per_page, 30);
        assert_eq!(list.total_count, 3);
        assert_eq!(list.monitors[0].monitor_type, "metric alert");
        assert_eq!(list.monitors[0].creator.handle, "a");
        assert_eq!(list.monitors[1].priority, Some(2));
    }

    #[test]
    fn ids_keep_order_and_count() {
        let ids = MonitorIds::project(search());
        assert_eq!(ids.count, 3);
        assert_eq!(
            ids.monitors.iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(ids.monitors[1].status, "Alert");
    }

    #[test]
    fn pages_returns_metadata() {
        assert_eq!(
            MonitorPages::project(search()),
            Metadata {
                page: 0,
                page_count: 1,
                per_page: 30,
                total_count: 3
            }
        );
    }

    #[test]
    fn triggered_checks_status_and_overall_state() {
        let triggered: Vec<i64> = search()
            .monitors
            .iter()
            .filter(|m| m.is_triggered())
            .map(|m| m.id)
            .collect();
        assert_eq!(triggered, vec![2, 3]);
    }

    #[test]
    fn monitor_serializes_type_field() {
        let monitor = Monitor {
            id: 9,
            monitor_type: "log alert".to_string(),
            ..Monitor::default()
        };
        let value = serde_json::to_value(&monitor).unwrap();
        assert_eq!(value["type"], "log alert");
        assert!(value.get("priority").is_none());
    }
}
