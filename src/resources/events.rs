//! Events: messages of the most recent events.

use serde::Deserialize;
use tracing::instrument;

use super::{aggregate, null_as_default, Resource, ResourceKind};
use crate::error::Result;
use crate::upstream::{urls, UpstreamClient};

/// `GET /api/v2/events` response, reduced to event messages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<EventRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: EventAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventAttributes {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: String,
}

/// Event messages in upstream order.
pub struct EventMessages;

impl Resource for EventMessages {
    const KIND: ResourceKind = ResourceKind::Events;
    type Shape = EventsResponse;
    type Output = Vec<String>;

    fn project(shape: EventsResponse) -> Vec<String> {
        shape
            .data
            .into_iter()
            .map(|event| event.attributes.message)
            .collect()
    }
}

/// Fetch recent event messages.
#[instrument(skip(client))]
pub async fn messages(client: &UpstreamClient) -> Result<Vec<String>> {
    aggregate::<EventMessages>(client, client.endpoint(urls::EVENTS)).await
}
