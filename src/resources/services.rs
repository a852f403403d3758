//! Service catalog: registered service definitions.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::ToSchema;

use super::{aggregate, null_as_default, Resource, ResourceKind};
use crate::error::Result;
use crate::upstream::{urls, UpstreamClient};

/// `GET /api/v2/services/definitions` response; returned with the same layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ServiceList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<ServiceData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ServiceData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub data_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: ServiceAttributes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ServiceAttributes {
    #[serde(default, deserialize_with = "null_as_default")]
    pub schema: ServiceSchema,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: ServiceMeta,
}

/// Service definition document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ServiceSchema {
    #[serde(rename = "schema-version", default, deserialize_with = "null_as_default")]
    pub schema_version: String,
    #[serde(rename = "dd-service", default, deserialize_with = "null_as_default")]
    pub dd_service: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub service_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ServiceMeta {
    #[serde(rename = "last-modified-time", default, deserialize_with = "null_as_default")]
    pub last_modified_time: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub origin: String,
    #[serde(rename = "origin-detail", default, deserialize_with = "null_as_default")]
    pub origin_detail: String,
}

/// Service catalog listing.
pub struct Services;

impl Resource for Services {
    const KIND: ResourceKind = ResourceKind::Services;
    type Shape = ServiceList;
    type Output = ServiceList;

    fn project(shape: ServiceList) -> ServiceList {
        debug!(count = shape.data.len(), "Listed service definitions");
        shape
    }
}

/// Fetch all service definitions.
#[instrument(skip(client))]
pub async fn list(client: &UpstreamClient) -> Result<ServiceList> {
    aggregate::<Services>(client, client.endpoint(urls::SERVICE_DEFINITIONS)).await
}
