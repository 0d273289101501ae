//! One client's view of a shared poem set editing channel.

use std::collections::HashMap;

use chrono::Utc;
use sonnet_core::collab::{
    is_valid_sonnet_index, ChannelMessage, PresenceEntry, SonnetLock,
};
use sonnet_core::poem::PoemSetDoc;
use sonnet_core::types::{DbId, Timestamp};

use crate::locks::LockTable;
use crate::merge::{merge_remote_update, MergeOutcome};
use crate::presence::PresenceTracker;

/// Pure-state composition of the presence tracker, lock table, and remote
/// update merger for one open poem set.
///
/// Inputs are [`ChannelMessage`]s from the transport; outputs are vectors
/// of outbound messages for the caller to send. Holding no transport handle
/// keeps the session testable by wiring two instances directly together.
pub struct EditSession {
    poem_set_id: DbId,
    me: PresenceEntry,
    doc: PoemSetDoc,
    focused: Option<usize>,
    presence: PresenceTracker,
    locks: LockTable,
    /// Last typing broadcast seen per sonnet; expiry is the caller's
    /// concern.
    typing: HashMap<usize, (DbId, Timestamp)>,
}

impl EditSession {
    pub fn new(
        poem_set_id: DbId,
        user_id: DbId,
        user_name: impl Into<String>,
        user_avatar: Option<String>,
        doc: PoemSetDoc,
    ) -> Self {
        Self {
            poem_set_id,
            me: PresenceEntry {
                user_id,
                user_name: user_name.into(),
                user_avatar,
                editing_sonnet: None,
                online_at: Utc::now(),
            },
            doc,
            focused: None,
            presence: PresenceTracker::new(),
            locks: LockTable::new(),
            typing: HashMap::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Local actions -> outbound messages
    // -----------------------------------------------------------------------

    /// To send right after the channel subscription succeeds: publish our
    /// own presence record.
    pub fn on_subscribed(&self) -> Vec<ChannelMessage> {
        vec![ChannelMessage::PresenceState {
            entry: self.me.clone(),
        }]
    }

    /// Focus a sonnet editor: update our presence record and broadcast an
    /// advisory lock. An out-of-range index is ignored.
    pub fn focus(&mut self, index: usize) -> Vec<ChannelMessage> {
        if !is_valid_sonnet_index(index) {
            tracing::warn!(index, "Ignoring focus on out-of-range sonnet");
            return Vec::new();
        }

        let mut outbound = Vec::new();

        // Moving focus directly between sonnets releases the old lock
        // first, as a blur would have.
        if let Some(previous) = self.focused.take() {
            if previous != index {
                self.locks.apply_unlock(previous, self.me.user_id);
                outbound.push(ChannelMessage::UnlockSonnet {
                    sonnet_index: previous,
                    user_id: self.me.user_id,
                });
            }
        }

        self.focused = Some(index);
        self.me.editing_sonnet = Some(index);

        let lock = SonnetLock {
            sonnet_index: index,
            user_id: self.me.user_id,
            user_name: self.me.user_name.clone(),
            locked_at: Utc::now(),
        };
        self.locks.apply_lock(lock.clone());

        outbound.push(ChannelMessage::LockSonnet { lock });
        outbound.push(ChannelMessage::PresenceState {
            entry: self.me.clone(),
        });
        outbound
    }

    /// Blur the focused sonnet editor: release our advisory lock and clear
    /// `editing_sonnet`. No-op when nothing is focused.
    pub fn blur(&mut self) -> Vec<ChannelMessage> {
        let Some(index) = self.focused.take() else {
            return Vec::new();
        };

        self.me.editing_sonnet = None;
        self.locks.apply_unlock(index, self.me.user_id);

        vec![
            ChannelMessage::UnlockSonnet {
                sonnet_index: index,
                user_id: self.me.user_id,
            },
            ChannelMessage::PresenceState {
                entry: self.me.clone(),
            },
        ]
    }

    /// A typing indicator for the focused sonnet, if any.
    pub fn typing(&self) -> Option<ChannelMessage> {
        self.focused.map(|sonnet_index| ChannelMessage::Typing {
            sonnet_index,
            user_id: self.me.user_id,
        })
    }

    // -----------------------------------------------------------------------
    // Local edits
    // -----------------------------------------------------------------------

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.doc.title = title.into();
    }

    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.doc.tags = tags;
    }

    /// Replace one line of one sonnet. Out-of-range positions are ignored.
    pub fn set_line(&mut self, sonnet: usize, line: usize, text: impl Into<String>) {
        if let Some(slot) = self
            .doc
            .poems
            .get_mut(sonnet)
            .and_then(|p| p.lines.get_mut(line))
        {
            *slot = text.into();
        } else {
            tracing::warn!(sonnet, line, "Ignoring edit at out-of-range position");
        }
    }

    // -----------------------------------------------------------------------
    // Inbound messages
    // -----------------------------------------------------------------------

    /// Route an inbound channel message into the trackers.
    ///
    /// Returns the [`MergeOutcome`] when the message was a document update
    /// for this poem set; `None` otherwise.
    pub fn handle_message(&mut self, msg: ChannelMessage) -> Option<MergeOutcome> {
        match msg {
            ChannelMessage::PresenceState { entry } => {
                if entry.user_id != self.me.user_id {
                    self.presence.apply_state(entry);
                }
                None
            }
            ChannelMessage::PresenceSync { entries } => {
                self.presence.apply_sync(entries);
                None
            }
            ChannelMessage::PresenceLeave { user_id } => {
                // The leaver's presence entry will be absent from the next
                // sync; only their locks need explicit cleanup.
                let released = self.locks.remove_user(user_id);
                if !released.is_empty() {
                    tracing::debug!(user_id, ?released, "Released locks on leave");
                }
                self.typing.retain(|_, (typist, _)| *typist != user_id);
                None
            }
            ChannelMessage::LockSonnet { lock } => {
                self.locks.apply_lock(lock);
                None
            }
            ChannelMessage::UnlockSonnet {
                sonnet_index,
                user_id,
            } => {
                self.locks.apply_unlock(sonnet_index, user_id);
                None
            }
            ChannelMessage::Typing {
                sonnet_index,
                user_id,
            } => {
                if user_id != self.me.user_id {
                    self.typing.insert(sonnet_index, (user_id, Utc::now()));
                }
                None
            }
            ChannelMessage::DocUpdated {
                poem_set_id, doc, ..
            } => {
                if poem_set_id != self.poem_set_id {
                    return None;
                }
                Some(merge_remote_update(&mut self.doc, &doc, self.focused))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn poem_set_id(&self) -> DbId {
        self.poem_set_id
    }

    pub fn doc(&self) -> &PoemSetDoc {
        &self.doc
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    pub fn locks(&self) -> &LockTable {
        &self.locks
    }

    /// `true` if the editor for this sonnet should be disabled for us.
    pub fn is_sonnet_locked(&self, index: usize) -> bool {
        self.locks.is_locked_by_other(index, self.me.user_id)
    }

    /// Who last typed in this sonnet, and when.
    pub fn typing_in(&self, index: usize) -> Option<(DbId, Timestamp)> {
        self.typing.get(&index).copied()
    }
}
