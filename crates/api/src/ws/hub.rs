//! Per-poem-set realtime channels.
//!
//! Each open poem set has a named channel shared by its collaborators.
//! The hub tracks one [`PresenceEntry`] per connection and fans a full
//! `presence.sync` out to the channel after every membership or
//! presence-state change. Ordering and delivery guarantees are whatever
//! the WebSocket transport provides; the hub adds none.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use sonnet_core::collab::{ChannelMessage, PresenceEntry};
use sonnet_core::types::DbId;
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type ChannelSender = mpsc::UnboundedSender<Message>;

/// One WebSocket connection subscribed to a poem set channel.
struct ChannelConn {
    user_id: DbId,
    entry: PresenceEntry,
    sender: ChannelSender,
}

/// All connections currently subscribed to one poem set.
#[derive(Default)]
struct Channel {
    connections: HashMap<String, ChannelConn>,
}

impl Channel {
    fn entries(&self) -> Vec<PresenceEntry> {
        self.connections.values().map(|c| c.entry.clone()).collect()
    }

    fn has_user(&self, user_id: DbId) -> bool {
        self.connections.values().any(|c| c.user_id == user_id)
    }

    fn send_to_all(&self, message: &Message) {
        // Closed send channels are silently skipped; those connections
        // clean themselves up on their next receive loop iteration.
        for conn in self.connections.values() {
            let _ = conn.sender.send(message.clone());
        }
    }
}

/// Manages all active poem set channels.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application.
pub struct ChannelHub {
    channels: RwLock<HashMap<DbId, Channel>>,
}

impl ChannelHub {
    /// Create a new, empty hub.
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribe a connection to a poem set channel.
    ///
    /// Returns the receiver half of the connection's message channel so
    /// the caller can forward messages to the WebSocket sink. Everyone on
    /// the channel (including the newcomer) receives a fresh
    /// `presence.sync`.
    pub async fn join(
        &self,
        poem_set_id: DbId,
        conn_id: String,
        entry: PresenceEntry,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut channels = self.channels.write().await;
        let channel = channels.entry(poem_set_id).or_default();
        channel.connections.insert(
            conn_id,
            ChannelConn {
                user_id: entry.user_id,
                entry,
                sender: tx,
            },
        );

        Self::sync_channel(poem_set_id, channel);
        rx
    }

    /// Unsubscribe a connection.
    ///
    /// If this was the user's last connection on the channel, a
    /// `presence.leave` is broadcast so clients can release the leaver's
    /// locks, followed by a fresh `presence.sync`. Empty channels are
    /// dropped.
    pub async fn leave(&self, poem_set_id: DbId, conn_id: &str) {
        let mut channels = self.channels.write().await;
        let Some(channel) = channels.get_mut(&poem_set_id) else {
            return;
        };

        let Some(removed) = channel.connections.remove(conn_id) else {
            return;
        };

        if !channel.has_user(removed.user_id) {
            if let Some(message) = encode(&ChannelMessage::PresenceLeave {
                user_id: removed.user_id,
            }) {
                channel.send_to_all(&message);
            }
        }

        if channel.connections.is_empty() {
            channels.remove(&poem_set_id);
        } else {
            Self::sync_channel(poem_set_id, channel);
        }
    }

    /// Replace a connection's presence record (focus/blur updates) and
    /// fan out a fresh `presence.sync`.
    pub async fn update_presence(&self, poem_set_id: DbId, conn_id: &str, entry: PresenceEntry) {
        let mut channels = self.channels.write().await;
        let Some(channel) = channels.get_mut(&poem_set_id) else {
            return;
        };
        let Some(conn) = channel.connections.get_mut(conn_id) else {
            return;
        };

        conn.entry = entry;
        Self::sync_channel(poem_set_id, channel);
    }

    /// Broadcast a protocol message to every connection on a channel.
    pub async fn broadcast(&self, poem_set_id: DbId, message: &ChannelMessage) {
        let channels = self.channels.read().await;
        let Some(channel) = channels.get(&poem_set_id) else {
            return;
        };
        if let Some(encoded) = encode(message) {
            channel.send_to_all(&encoded);
        }
    }

    /// Current presence entries on a channel (one per connection).
    pub async fn presence_entries(&self, poem_set_id: DbId) -> Vec<PresenceEntry> {
        self.channels
            .read()
            .await
            .get(&poem_set_id)
            .map(Channel::entries)
            .unwrap_or_default()
    }

    /// Total number of active connections across all channels.
    pub async fn connection_count(&self) -> usize {
        self.channels
            .read()
            .await
            .values()
            .map(|c| c.connections.len())
            .sum()
    }

    /// Number of channels with at least one subscriber.
    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }

    /// Send a Ping frame to every connected client.
    ///
    /// Used by the heartbeat task to keep connections alive and detect
    /// stale ones.
    pub async fn ping_all(&self) {
        let channels = self.channels.read().await;
        for channel in channels.values() {
            channel.send_to_all(&Message::Ping(Bytes::new()));
        }
    }

    /// Send a Close frame to every connection, then clear all channels.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server stops accepting new connections.
    pub async fn shutdown_all(&self) {
        let mut channels = self.channels.write().await;
        let count: usize = channels.values().map(|c| c.connections.len()).sum();
        for channel in channels.values() {
            channel.send_to_all(&Message::Close(None));
        }
        channels.clear();
        tracing::info!(count, "Closed all channel connections");
    }

    /// Fan a full `presence.sync` out to every connection on a channel.
    fn sync_channel(poem_set_id: DbId, channel: &Channel) {
        let sync = ChannelMessage::PresenceSync {
            entries: channel.entries(),
        };
        if let Some(message) = encode(&sync) {
            tracing::debug!(
                poem_set_id,
                connections = channel.connections.len(),
                "Presence sync"
            );
            channel.send_to_all(&message);
        }
    }
}

impl Default for ChannelHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize a protocol message into a WebSocket text frame.
fn encode(message: &ChannelMessage) -> Option<Message> {
    match serde_json::to_string(message) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize channel message");
            None
        }
    }
}
