//! Route definitions for the `/groups` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::group;
use crate::state::AppState;

/// Routes mounted at `/groups`.
///
/// ```text
/// GET    /               -> list the user's groups
/// POST   /               -> create group (creator becomes owner)
/// GET    /{id}           -> get (members only)
/// PUT    /{id}           -> update (owner)
/// DELETE /{id}           -> delete (owner)
/// GET    /{id}/members   -> list members
/// POST   /{id}/members   -> add member (owner)
/// DELETE /{id}/members   -> remove member (owner) / leave (self)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(group::list).post(group::create))
        .route(
            "/{id}",
            get(group::get).put(group::update).delete(group::delete),
        )
        .route(
            "/{id}/members",
            get(group::list_members)
                .post(group::add_member)
                .delete(group::remove_member),
        )
}
