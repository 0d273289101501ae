//! Route definitions for the `/friends` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::friend;
use crate::state::AppState;

/// Routes mounted at `/friends`.
///
/// ```text
/// GET    /               -> list friendships (pending first)
/// POST   /               -> send friend request
/// POST   /{id}/accept    -> accept (addressee only)
/// POST   /{id}/decline   -> decline (addressee only)
/// DELETE /{id}           -> remove friendship / retract request
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(friend::list).post(friend::create))
        .route("/{id}/accept", post(friend::accept))
        .route("/{id}/decline", post(friend::decline))
        .route("/{id}", delete(friend::remove))
}
