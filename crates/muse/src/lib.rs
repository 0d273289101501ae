//! HTTP client for the external poem generation service ("the muse").
//!
//! Poem generation is delegated entirely to a hosted large-language-model
//! API; this crate only submits a request, validates the structure of the
//! returned document (ten sonnets of fourteen non-blank lines), and hands
//! back a [`PoemSetDoc`](sonnet_core::poem::PoemSetDoc). No retries: a
//! failed generation is terminal for that one request.

pub mod client;
pub mod prompt;

pub use client::{GenerateRequest, MuseClient, MuseError};
