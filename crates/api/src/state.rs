use std::sync::Arc;

use crate::config::ServerConfig;
use crate::ws::ChannelHub;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: sonnet_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Per-poem-set realtime channels (presence, locks, broadcasts).
    pub channel_hub: Arc<ChannelHub>,
    /// Centralized event bus for publishing platform events.
    pub event_bus: Arc<sonnet_events::EventBus>,
    /// Client for the external poem generation service.
    pub muse: Arc<sonnet_muse::MuseClient>,
}
