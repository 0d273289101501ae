//! Handlers for the `/friends` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use sonnet_core::error::CoreError;
use sonnet_core::types::DbId;
use sonnet_db::models::friendship::{CreateFriendRequest, Friendship};
use sonnet_db::repositories::{FriendshipRepo, UserRepo};
use sonnet_events::bus::event_types;
use sonnet_events::PlatformEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/friends
///
/// All friendships involving the user, pending requests first.
pub async fn list(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Friendship>>>> {
    let friendships = FriendshipRepo::list_for_user(&state.pool, auth_user.user_id).await?;
    Ok(Json(DataResponse::new(friendships)))
}

/// POST /api/v1/friends
///
/// Send a friend request. Duplicate requests hit the unique pair
/// constraint and come back as 409.
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<CreateFriendRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Friendship>>)> {
    if input.addressee_id == auth_user.user_id {
        return Err(AppError::Core(CoreError::Validation(
            "You cannot befriend yourself".into(),
        )));
    }
    if UserRepo::find_by_id(&state.pool, input.addressee_id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "user",
            id: input.addressee_id,
        }));
    }

    let friendship =
        FriendshipRepo::create(&state.pool, auth_user.user_id, input.addressee_id).await?;

    state.event_bus.publish(
        PlatformEvent::new(event_types::FRIEND_REQUESTED)
            .with_source("friendship", friendship.id)
            .with_actor(auth_user.user_id)
            .with_payload(json!({ "addressee_id": input.addressee_id })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse::new(friendship))))
}

/// POST /api/v1/friends/{id}/accept
///
/// Only the addressee of a pending request can accept it.
pub async fn accept(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Friendship>>> {
    let friendship = FriendshipRepo::answer(&state.pool, id, auth_user.user_id, true)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "friend_request",
            id,
        }))?;

    state.event_bus.publish(
        PlatformEvent::new(event_types::FRIEND_ACCEPTED)
            .with_source("friendship", friendship.id)
            .with_actor(auth_user.user_id)
            .with_payload(json!({ "requester_id": friendship.requester_id })),
    );

    Ok(Json(DataResponse::new(friendship)))
}

/// POST /api/v1/friends/{id}/decline
pub async fn decline(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Friendship>>> {
    let friendship = FriendshipRepo::answer(&state.pool, id, auth_user.user_id, false)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "friend_request",
            id,
        }))?;
    Ok(Json(DataResponse::new(friendship)))
}

/// DELETE /api/v1/friends/{id}
///
/// Either side can remove a friendship (or retract a pending request).
pub async fn remove(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let removed = FriendshipRepo::remove(&state.pool, id, auth_user.user_id).await?;
    if !removed {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "friendship",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
