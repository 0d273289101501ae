//! Advisory sonnet lock table.

use std::collections::HashMap;

use sonnet_core::collab::SonnetLock;
use sonnet_core::types::DbId;

/// Local table of advisory sonnet locks, keyed by sonnet index.
///
/// At most one remembered holder per index. A new lock broadcast for an
/// index evicts the prior entry (last-writer-wins, no ordering guarantee:
/// two near-simultaneous locks can each be "current" on different clients
/// depending on delivery order). Locks are never enforced at the write
/// layer; they only drive the editor UI.
#[derive(Debug, Default)]
pub struct LockTable {
    locks: HashMap<usize, SonnetLock>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a lock, evicting any existing entry for the same index.
    ///
    /// Returns the evicted lock, if there was one.
    pub fn apply_lock(&mut self, lock: SonnetLock) -> Option<SonnetLock> {
        self.locks.insert(lock.sonnet_index, lock)
    }

    /// Remove the lock for `sonnet_index`, but only if `user_id` matches
    /// the recorded holder. A stale unlock from an already-superseded
    /// holder must not evict a newer lock.
    ///
    /// Returns `true` if an entry was removed.
    pub fn apply_unlock(&mut self, sonnet_index: usize, user_id: DbId) -> bool {
        match self.locks.get(&sonnet_index) {
            Some(held) if held.user_id == user_id => {
                self.locks.remove(&sonnet_index);
                true
            }
            _ => false,
        }
    }

    /// Remove every lock held by `user_id` (presence leave cleanup).
    ///
    /// Returns the indices that were released.
    pub fn remove_user(&mut self, user_id: DbId) -> Vec<usize> {
        let released: Vec<usize> = self
            .locks
            .iter()
            .filter(|(_, lock)| lock.user_id == user_id)
            .map(|(&index, _)| index)
            .collect();
        for index in &released {
            self.locks.remove(index);
        }
        released
    }

    /// The recorded holder for a sonnet, if any.
    pub fn holder(&self, sonnet_index: usize) -> Option<&SonnetLock> {
        self.locks.get(&sonnet_index)
    }

    /// `true` if someone other than `me` holds the lock for this sonnet.
    /// Drives the "locked by X" overlay and textarea disabling.
    pub fn is_locked_by_other(&self, sonnet_index: usize, me: DbId) -> bool {
        self.locks
            .get(&sonnet_index)
            .is_some_and(|lock| lock.user_id != me)
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
