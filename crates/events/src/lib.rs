//! Sonnet-Machine event bus infrastructure.
//!
//! This crate provides the building blocks for row-change notification and
//! the durable event log:
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`] — the canonical domain event envelope; the
//!   `poem_set.updated` event carries the full new document and is what the
//!   collaborative editing layer consumes as a row-change notification.
//! - [`EventPersistence`] — background service that durably writes every
//!   event to the `events` table.

pub mod bus;
pub mod persistence;

pub use bus::{EventBus, PlatformEvent};
pub use persistence::EventPersistence;
