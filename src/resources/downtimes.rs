//! Downtimes: monitor ids and scopes of every scheduled downtime.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::ToSchema;

use super::{aggregate, null_as_default, Resource, ResourceKind};
use crate::error::Result;
use crate::upstream::{urls, UpstreamClient};

/// `GET /api/v2/downtime` response, reduced to the fields we read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DowntimesResponse {
    /// Downtime records in upstream order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<DowntimeRecord>,
}

/// One downtime record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DowntimeRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: DowntimeAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DowntimeAttributes {
    #[serde(default, deserialize_with = "null_as_default")]
    pub monitor_identifier: MonitorIdentifier,
    #[serde(default, deserialize_with = "null_as_default")]
    pub scope: String,
}

/// Which monitor a downtime silences. Tag-based downtimes carry no id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonitorIdentifier {
    #[serde(default, deserialize_with = "null_as_default")]
    pub monitor_id: i64,
}

/// Flattened downtimes: `ids[i]` and `scopes[i]` come from the same record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DowntimeSummary {
    /// Monitor id of each downtime, 0 when the downtime targets tags.
    pub ids: Vec<i64>,
    /// Scope of each downtime.
    pub scopes: Vec<String>,
}

/// Downtime listing resource.
pub struct Downtimes;

impl Resource for Downtimes {
    const KIND: ResourceKind = ResourceKind::Downtimes;
    type Shape = DowntimesResponse;
    type Output = DowntimeSummary;

    fn project(shape: DowntimesResponse) -> DowntimeSummary {
        let mut summary = DowntimeSummary {
            ids: Vec::with_capacity(shape.data.len()),
            scopes: Vec::with_capacity(shape.data.len()),
        };

        for record in shape.data {
            let attributes = record.attributes;
            summary.ids.push(attributes.monitor_identifier.monitor_id);
            summary.scopes.push(attributes.scope);
        }

        debug!(
            count = summary.ids.len(),
            ids = ?summary.ids,
            scopes = ?summary.scopes,
            "Projected downtimes"
        );

        summary
    }
}

/// Fetch all downtimes and flatten them.
#[instrument(skip(client))]
pub async fn summarize(client: &UpstreamClient) -> Result<DowntimeSummary> {
    aggregate::<Downtimes>(client, client.endpoint(urls::DOWNTIMES)).await
}
