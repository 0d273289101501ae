//! Bridges row-change events from the event bus into realtime channels.

use std::sync::Arc;

use sonnet_core::collab::ChannelMessage;
use sonnet_core::poem::PoemSetDoc;
use sonnet_events::bus::event_types;
use sonnet_events::PlatformEvent;
use tokio::sync::broadcast;

use crate::ws::ChannelHub;

/// Background service that forwards `poem_set.updated` events to the
/// updated set's channel as `doc.updated` messages.
///
/// Every store write to a poem set publishes an event carrying the full
/// new document; collaborators with the set open receive it here and run
/// their local merge.
pub struct RowChangeRouter {
    hub: Arc<ChannelHub>,
}

impl RowChangeRouter {
    pub fn new(hub: Arc<ChannelHub>) -> Self {
        Self { hub }
    }

    /// Run the router loop until the event bus closes.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.route(event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Row-change router lagged, updates dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, row-change router shutting down");
                    break;
                }
            }
        }
    }

    async fn route(&self, event: PlatformEvent) {
        if event.event_type != event_types::POEM_SET_UPDATED {
            return;
        }
        let Some(poem_set_id) = event.source_entity_id else {
            return;
        };

        let doc: PoemSetDoc = match serde_json::from_value(event.payload["doc"].clone()) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    poem_set_id,
                    "poem_set.updated event without a decodable document"
                );
                return;
            }
        };

        self.hub
            .broadcast(
                poem_set_id,
                &ChannelMessage::DocUpdated {
                    poem_set_id,
                    doc,
                    updated_by: event.actor_user_id,
                },
            )
            .await;
    }
}
