//! Presence tracking for one open poem set channel.

use std::collections::HashMap;

use sonnet_core::collab::PresenceEntry;
use sonnet_core::types::DbId;

/// Local view of who is currently on the channel.
///
/// Rebuilt wholesale from every `presence.sync` event and updated
/// incrementally from `presence.state` broadcasts. Leave events do not
/// remove entries here: a departed user is simply absent from the next
/// sync. There is no timeout-based expiry, so a lost leave event keeps a
/// stale entry visible until the next full sync arrives.
#[derive(Debug, Default)]
pub struct PresenceTracker {
    entries: HashMap<DbId, PresenceEntry>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole entry set with the server's current view.
    pub fn apply_sync(&mut self, entries: Vec<PresenceEntry>) {
        self.entries = entries.into_iter().map(|e| (e.user_id, e)).collect();
    }

    /// Upsert a single user's presence record from a state broadcast.
    pub fn apply_state(&mut self, entry: PresenceEntry) {
        self.entries.insert(entry.user_id, entry);
    }

    /// The presence record for one user, if they are known to be online.
    pub fn get(&self, user_id: DbId) -> Option<&PresenceEntry> {
        self.entries.get(&user_id)
    }

    /// Everyone currently on the channel, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = &PresenceEntry> {
        self.entries.values()
    }

    /// Users whose presence record says they are editing the given sonnet.
    pub fn editing_sonnet(&self, index: usize) -> impl Iterator<Item = &PresenceEntry> {
        self.entries
            .values()
            .filter(move |e| e.editing_sonnet == Some(index))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(user_id: DbId, editing: Option<usize>) -> PresenceEntry {
        PresenceEntry {
            user_id,
            user_name: format!("user-{user_id}"),
            user_avatar: None,
            editing_sonnet: editing,
            online_at: Utc::now(),
        }
    }

    #[test]
    fn test_sync_replaces_entry_set() {
        let mut tracker = PresenceTracker::new();
        tracker.apply_sync(vec![entry(1, None), entry(2, Some(4))]);
        assert_eq!(tracker.len(), 2);

        // User 1 is gone from the next sync.
        tracker.apply_sync(vec![entry(2, Some(4)), entry(3, None)]);
        assert_eq!(tracker.len(), 2);
        assert!(tracker.get(1).is_none());
        assert!(tracker.get(3).is_some());
    }

    #[test]
    fn test_state_upserts_single_entry() {
        let mut tracker = PresenceTracker::new();
        tracker.apply_sync(vec![entry(1, None)]);

        tracker.apply_state(entry(1, Some(7)));
        assert_eq!(tracker.get(1).unwrap().editing_sonnet, Some(7));

        tracker.apply_state(entry(2, None));
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_editing_sonnet_lookup() {
        let mut tracker = PresenceTracker::new();
        tracker.apply_sync(vec![entry(1, Some(3)), entry(2, Some(3)), entry(3, None)]);

        let editors: Vec<DbId> = tracker.editing_sonnet(3).map(|e| e.user_id).collect();
        assert_eq!(editors.len(), 2);
        assert!(editors.contains(&1) && editors.contains(&2));
        assert_eq!(tracker.editing_sonnet(0).count(), 0);
    }

    #[test]
    fn test_stale_entry_survives_until_next_sync() {
        let mut tracker = PresenceTracker::new();
        tracker.apply_sync(vec![entry(1, None), entry(2, None)]);

        // A leave event does not touch the tracker; the entry lingers.
        assert!(tracker.get(2).is_some());

        tracker.apply_sync(vec![entry(1, None)]);
        assert!(tracker.get(2).is_none());
    }
}
