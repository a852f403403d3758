//! Upstream resource kinds and the generic aggregation pipeline.
//!
//! Each resource declares the upstream shape it decodes and a projection to
//! its output shape. Fetching, decoding, and error classification are shared.

pub mod downtimes;
pub mod events;
pub mod hosts;
pub mod monitors;
pub mod services;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use tracing::debug;
use url::Url;

use crate::error::{self, GatewayError};
use crate::upstream::UpstreamClient;

pub use downtimes::{DowntimeSummary, Downtimes};

/// Upstream resource kinds served by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ResourceKind {
    /// Scheduled downtimes.
    Downtimes,
    /// Monitor definitions and states.
    Monitors,
    /// Reporting hosts.
    Hosts,
    /// Per-host tags.
    HostTags,
    /// Event stream.
    Events,
    /// Service catalog definitions.
    Services,
}

/// An upstream resource: the shape it decodes from and how it is projected.
pub trait Resource {
    /// Kind label used for logs and metrics.
    const KIND: ResourceKind;

    /// Subset of the upstream JSON this resource reads.
    type Shape: DeserializeOwned + Send;

    /// Flattened output returned to callers.
    type Output: Serialize + Send;

    /// Project a decoded upstream payload into the output shape.
    fn project(shape: Self::Shape) -> Self::Output;
}

/// Fetch `url`, decode it as `R::Shape`, and project it.
///
/// Either the whole projection succeeds or an error is returned; output is
/// never partially built.
pub async fn aggregate<R: Resource>(
    client: &UpstreamClient,
    url: Url,
) -> error::Result<R::Output> {
    let fetched = client.get_json::<R::Shape>(R::KIND, url).await?;
    debug!(resource = %R::KIND, bytes = fetched.raw.len(), "Aggregating upstream payload");
    Ok(R::project(fetched.value))
}

/// Run the default aggregation for a resource kind and return it as JSON.
pub async fn fetch_default(
    client: &UpstreamClient,
    kind: ResourceKind,
) -> error::Result<serde_json::Value> {
    match kind {
        ResourceKind::Downtimes => to_value(&downtimes::summarize(client).await?),
        ResourceKind::Monitors => {
            to_value(&monitors::list(client, monitors::Pagination::default()).await?)
        }
        ResourceKind::Hosts => to_value(&hosts::names(client).await?),
        ResourceKind::HostTags => to_value(&hosts::all_tags(client).await?),
        ResourceKind::Events => to_value(&events::messages(client).await?),
        ResourceKind::Services => to_value(&services::list(client).await?),
    }
}

fn to_value<T: Serialize>(value: &T) -> error::Result<serde_json::Value> {
    serde_json::to_value(value).map_err(GatewayError::EncodeFailed)
}

/// Decode `null` as the type's default, as a missing field would be.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
