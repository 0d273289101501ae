//! Route definitions for the `/messages` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::message;
use crate::state::AppState;

/// Routes mounted at `/messages`.
///
/// ```text
/// GET  /                  -> inbox (newest first)
/// POST /                  -> send (friends only)
/// GET  /unread-count      -> unread count
/// GET  /with/{user_id}    -> two-way conversation
/// POST /{id}/read         -> mark read (recipient only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(message::inbox).post(message::send))
        .route("/unread-count", get(message::unread_count))
        .route("/with/{user_id}", get(message::conversation))
        .route("/{id}/read", post(message::mark_read))
}
