//! Hosts: reporting host names, active host totals, and host tags.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use utoipa::ToSchema;

use super::{aggregate, null_as_default, Resource, ResourceKind};
use crate::error::Result;
use crate::upstream::{urls, UpstreamClient};

/// `GET /api/v1/hosts` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostListResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub host_list: Vec<Host>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_matching: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_returned: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Host {
    #[serde(default, deserialize_with = "null_as_default")]
    pub host_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub aliases: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub up: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_muted: bool,
}

/// Active and up host counts; decoded and returned as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HostTotals {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_active: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_up: i64,
}

/// Tags attached to one host; decoded and returned as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HostTags {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

/// Host names in upstream order.
pub struct HostNames;

impl Resource for HostNames {
    const KIND: ResourceKind = ResourceKind::Hosts;
    type Shape = HostListResponse;
    type Output = Vec<String>;

    fn project(shape: HostListResponse) -> Vec<String> {
        shape.host_list.into_iter().map(|h| h.host_name).collect()
    }
}

/// Host totals.
pub struct ActiveHosts;

impl Resource for ActiveHosts {
    const KIND: ResourceKind = ResourceKind::Hosts;
    type Shape = HostTotals;
    type Output = HostTotals;

    fn project(shape: HostTotals) -> HostTotals {
        shape
    }
}

/// Tags of a single host.
pub struct HostTagList;

impl Resource for HostTagList {
    const KIND: ResourceKind = ResourceKind::HostTags;
    type Shape = HostTags;
    type Output = HostTags;

    fn project(shape: HostTags) -> HostTags {
        shape
    }
}

/// Fetch the names of all reporting hosts.
#[instrument(skip(client))]
pub async fn names(client: &UpstreamClient) -> Result<Vec<String>> {
    aggregate::<HostNames>(client, client.endpoint(urls::HOSTS)).await
}

/// Fetch active and up host totals.
#[instrument(skip(client))]
pub async fn totals(client: &UpstreamClient) -> Result<HostTotals> {
    aggregate::<ActiveHosts>(client, client.endpoint(urls::HOST_TOTALS)).await
}

/// Fetch the tags of one host.
#[instrument(skip(client))]
pub async fn tags(client: &UpstreamClient, hostname: &str) -> Result<HostTags> {
    aggregate::<HostTagList>(client, client.endpoint_segment(urls::HOST_TAGS, hostname)).await
}

/// Fetch the tags of every reporting host, keyed by host name.
///
/// Failing to list hosts fails the call. A failure for one host is recorded
/// as a single `"error: ..."` entry in that host's tags and the walk goes on.
#[instrument(skip(client))]
pub async fn all_tags(client: &UpstreamClient) -> Result<BTreeMap<String, Vec<String>>> {
    let hostnames = names(client).await?;
    let mut result = BTreeMap::new();

    // Unnamed hosts have no tag endpoint of their own.
    for hostname in hostnames.into_iter().filter(|h| !h.is_empty()) {
        let entry = match tags(client, &hostname).await {
            Ok(host_tags) => host_tags.tags,
            Err(e) => {
                warn!(host = %hostname, error = %e, "Failed to fetch host tags");
                vec![format!("error: {}", e)]
            }
        };
        result.insert(hostname, entry);
    }

    debug!(hosts = result.len(), "Collected host tags");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_names_keep_order() {
        let shape: HostListResponse = serde_json::from_str(
            r#"{"host_list":[
                {"host_name":"web-2","up":true,"meta":{"platform":"linux"}},
                {"host_name":"web-1","is_muted":true},
                {"name":"no-host-name"}
            ],"total_matching":3,"total_returned":3}"#,
        )
        .unwrap();

        assert_eq!(HostNames::project(shape), vec!["web-2", "web-1", ""]);
    }

    #[test]
    fn empty_host_list_yields_empty_names() {
        let shape: HostListResponse = serde_json::from_str(r#"{"host_list":null}"#).unwrap();
        assert!(HostNames::project(shape).is_empty());
    }

    #[test]
    fn host_tags_decode() {
        let shape: HostTags =
            serde_json::from_str(r#"{"tags":["role:db","env:prod"],"host":"db-1"}"#).unwrap();
        assert_eq!(HostTagList::project(shape).tags, vec!["role:db", "env:prod"]);

        let empty: HostTags = serde_json::from_str(r#"{"tags":null}"#).unwrap();
        assert!(empty.tags.is_empty());
    }

    #[test]
    fn totals_decode() {
        let totals: HostTotals =
            serde_json::from_str(r#"{"total_active":12,"total_up":10}"#).unwrap();
        assert_eq!(
            ActiveHosts::project(totals),
            HostTotals {
                total_active: 12,
                total_up: 10
            }
        );
    }
}
