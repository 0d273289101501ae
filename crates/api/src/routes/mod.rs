pub mod auth;
pub mod friends;
pub mod groups;
pub mod health;
pub mod messages;
pub mod poem_sets;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws/poem-sets/{id}                 poem set channel WebSocket (?token=)
///
/// /auth/register                     register (public)
/// /auth/login                        login (public)
/// /auth/refresh                      refresh (public)
/// /auth/logout                       logout (requires auth)
///
/// /poem-sets                         list, create
/// /poem-sets/public                  published public sets (public listing)
/// /poem-sets/generate                muse generation (POST)
/// /poem-sets/{id}                    get, update, delete
/// /poem-sets/{id}/publish            validate + freeze structure (POST)
/// /poem-sets/{id}/read               combinatorial reader (?selection=)
/// /poem-sets/{id}/collaborators      list, add, remove
///
/// /friends                           list, request
/// /friends/{id}/accept               accept request (POST)
/// /friends/{id}/decline              decline request (POST)
/// /friends/{id}                      remove (DELETE)
///
/// /groups                            list, create
/// /groups/{id}                       get, update, delete
/// /groups/{id}/members               list, add, remove
///
/// /messages                          inbox, send
/// /messages/unread-count             unread count (GET)
/// /messages/with/{user_id}           conversation (GET)
/// /messages/{id}/read                mark read (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Poem set channel WebSocket.
        .route("/ws/poem-sets/{id}", get(ws::ws_handler))
        // Authentication routes.
        .nest("/auth", auth::router())
        // Poem sets: CRUD, publishing, reader, generation, collaborators.
        .nest("/poem-sets", poem_sets::router())
        // Friendships.
        .nest("/friends", friends::router())
        // Groups and memberships.
        .nest("/groups", groups::router())
        // Direct messages.
        .nest("/messages", messages::router())
}
