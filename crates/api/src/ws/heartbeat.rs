use std::sync::Arc;
use std::time::Duration;

use crate::ws::hub::ChannelHub;

/// Interval between heartbeat pings (in seconds).
const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Spawn a background task that sends periodic Ping frames to every
/// connected channel client.
///
/// The returned `JoinHandle` can be used to abort the task during
/// shutdown.
pub fn start_heartbeat(hub: Arc<ChannelHub>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));

        loop {
            interval.tick().await;
            let count = hub.connection_count().await;
            tracing::debug!(count, "Channel heartbeat ping");
            hub.ping_all().await;
        }
    })
}
