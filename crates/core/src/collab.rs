//! Real-time collaboration types and the channel message protocol.
//!
//! This module lives in `core` (zero internal deps) so that the API layer,
//! the WebSocket channel hub, and the client-side edit session can all
//! reference the same presence/lock types and message shapes.
//!
//! Presence entries and sonnet locks are ephemeral: every client keeps its
//! own copy reconstructed from broadcast and sync events, and the server
//! keeps only the live channel membership. Nothing here is persisted and
//! locks are advisory only.

use serde::{Deserialize, Serialize};

use crate::poem::{PoemSetDoc, POEMS_PER_SET};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Channel naming
// ---------------------------------------------------------------------------

/// The channel a poem set's collaborators share.
pub fn channel_name(poem_set_id: DbId) -> String {
    format!("poem_set:{poem_set_id}")
}

/// Returns `true` if the given sonnet index can appear in lock or focus
/// messages.
pub fn is_valid_sonnet_index(index: usize) -> bool {
    index < POEMS_PER_SET
}

// ---------------------------------------------------------------------------
// Presence and lock records
// ---------------------------------------------------------------------------

/// One user's live presence on a poem set channel.
///
/// Created when the user's connection joins the channel, updated on
/// focus/blur of a sonnet editor, and gone from the next sync once the
/// connection drops. There is no timeout-based expiry: if a leave event is
/// lost, the stale entry persists until the next full sync.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PresenceEntry {
    pub user_id: DbId,
    pub user_name: String,
    pub user_avatar: Option<String>,
    /// The sonnet this user is currently editing, if any.
    pub editing_sonnet: Option<usize>,
    pub online_at: Timestamp,
}

/// An advisory lock on one sonnet of a shared poem set.
///
/// At most one remembered holder per sonnet index; a newer lock broadcast
/// for the same index evicts the prior one (last-writer-wins, no server
/// arbitration). Nothing prevents an unlocked editor from writing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SonnetLock {
    pub sonnet_index: usize,
    pub user_id: DbId,
    pub user_name: String,
    pub locked_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Channel message protocol
// ---------------------------------------------------------------------------

/// Messages exchanged over a poem set channel.
///
/// Serialized as JSON with an internally-tagged `"type"` discriminator so
/// that clients can route messages by type string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ChannelMessage {
    /// Client sends: this is my current presence record (track / update).
    #[serde(rename = "presence.state")]
    PresenceState { entry: PresenceEntry },

    /// Server broadcasts: the full current presence set. Replaces every
    /// client's local idea of who is online.
    #[serde(rename = "presence.sync")]
    PresenceSync { entries: Vec<PresenceEntry> },

    /// Server broadcasts: a user's connection left the channel.
    #[serde(rename = "presence.leave")]
    PresenceLeave { user_id: DbId },

    /// Broadcast: a user focused a sonnet editor.
    #[serde(rename = "lock_sonnet")]
    LockSonnet { lock: SonnetLock },

    /// Broadcast: a user blurred a sonnet editor.
    #[serde(rename = "unlock_sonnet")]
    UnlockSonnet { sonnet_index: usize, user_id: DbId },

    /// Broadcast: a user is typing in a sonnet editor.
    #[serde(rename = "typing")]
    Typing { sonnet_index: usize, user_id: DbId },

    /// Server broadcasts: the backing row changed; carries the full new
    /// document for the remote update merger.
    #[serde(rename = "doc.updated")]
    DocUpdated {
        poem_set_id: DbId,
        doc: PoemSetDoc,
        updated_by: Option<DbId>,
    },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(user_id: DbId) -> PresenceEntry {
        PresenceEntry {
            user_id,
            user_name: format!("user-{user_id}"),
            user_avatar: None,
            editing_sonnet: None,
            online_at: Utc::now(),
        }
    }

    #[test]
    fn test_channel_name() {
        assert_eq!(channel_name(42), "poem_set:42");
    }

    #[test]
    fn test_sonnet_index_bounds() {
        assert!(is_valid_sonnet_index(0));
        assert!(is_valid_sonnet_index(9));
        assert!(!is_valid_sonnet_index(10));
    }

    #[test]
    fn test_presence_state_serialization() {
        let msg = ChannelMessage::PresenceState { entry: entry(7) };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"presence.state"#));

        let deserialized: ChannelMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, deserialized);
    }

    #[test]
    fn test_presence_sync_serialization() {
        let msg = ChannelMessage::PresenceSync {
            entries: vec![entry(1), entry(2)],
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"presence.sync"#));

        let deserialized: ChannelMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, deserialized);
    }

    #[test]
    fn test_lock_sonnet_serialization() {
        let msg = ChannelMessage::LockSonnet {
            lock: SonnetLock {
                sonnet_index: 3,
                user_id: 9,
                user_name: "anna".to_string(),
                locked_at: Utc::now(),
            },
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"lock_sonnet"#));

        let deserialized: ChannelMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, deserialized);
    }

    #[test]
    fn test_unlock_sonnet_serialization() {
        let msg = ChannelMessage::UnlockSonnet {
            sonnet_index: 3,
            user_id: 9,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"unlock_sonnet"#));

        let deserialized: ChannelMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, deserialized);
    }

    #[test]
    fn test_doc_updated_serialization() {
        let msg = ChannelMessage::DocUpdated {
            poem_set_id: 5,
            doc: crate::poem::PoemSetDoc::blank(),
            updated_by: Some(2),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"doc.updated"#));

        let deserialized: ChannelMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, deserialized);
    }
}
