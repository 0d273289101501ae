//! Route definitions for the `/poem-sets` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{generation, poem_set};
use crate::state::AppState;

/// Routes mounted at `/poem-sets`.
///
/// ```text
/// GET    /                     -> list (owned + collaborating)
/// POST   /                     -> create draft
/// GET    /public               -> published public sets
/// POST   /generate             -> muse generation
/// GET    /{id}                 -> get
/// PUT    /{id}                 -> update (save path)
/// DELETE /{id}                 -> delete (owner)
/// POST   /{id}/publish         -> validate + publish (owner)
/// GET    /{id}/read            -> combinatorial reader
/// GET    /{id}/collaborators   -> list collaborators
/// POST   /{id}/collaborators   -> invite (owner)
/// DELETE /{id}/collaborators   -> remove (owner or self)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(poem_set::list).post(poem_set::create))
        .route("/public", get(poem_set::list_public))
        .route("/generate", post(generation::generate))
        .route(
            "/{id}",
            get(poem_set::get)
                .put(poem_set::update)
                .delete(poem_set::delete),
        )
        .route("/{id}/publish", post(poem_set::publish))
        .route("/{id}/read", get(poem_set::read))
        .route(
            "/{id}/collaborators",
            get(poem_set::list_collaborators)
                .post(poem_set::add_collaborator)
                .delete(poem_set::remove_collaborator),
        )
}
