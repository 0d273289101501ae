//! Client-side collaborative editing core for poem sets.
//!
//! Everything in this crate except the autosave scheduler is pure state: the
//! trackers consume [`ChannelMessage`](sonnet_core::collab::ChannelMessage)s
//! and produce outbound message vectors, so two simulated clients can be
//! wired together in tests without any transport.
//!
//! - [`PresenceTracker`] — who is online and which sonnet each is editing.
//! - [`LockTable`] — advisory per-sonnet locks, last-writer-wins.
//! - [`merge_remote_update`] — applies incoming full-document updates,
//!   shielding only the locally focused sonnet.
//! - [`AutosaveScheduler`] — debounced flush of local edits to a
//!   [`DocumentStore`].
//! - [`EditSession`] — composes the above for one open poem set.

pub mod autosave;
pub mod locks;
pub mod merge;
pub mod presence;
pub mod session;

pub use autosave::{AutosaveScheduler, DocumentStore, SaveError};
pub use locks::LockTable;
pub use merge::{merge_remote_update, MergeOutcome};
pub use presence::PresenceTracker;
pub use session::EditSession;
