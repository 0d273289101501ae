//! Sonnet-Machine domain core.
//!
//! This crate has zero internal dependencies so that the repository layer,
//! API handlers, WebSocket plumbing, and the collaborative editing session
//! can all reference the same types, constants, and validation rules:
//!
//! - [`poem`] — poem sets, statuses, and publish-time structural validation.
//! - [`reader`] — the combinatorial reader (per-line selection arithmetic).
//! - [`collab`] — presence/lock types and the channel message protocol.
//! - [`error`] — the shared [`CoreError`](error::CoreError) taxonomy.

pub mod collab;
pub mod error;
pub mod poem;
pub mod reader;
pub mod types;
