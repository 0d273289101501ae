//! Handlers for the `/groups` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use sonnet_core::error::CoreError;
use sonnet_core::types::DbId;
use sonnet_db::models::group::{CreateGroup, Group, GroupMember, UpdateGroup};
use sonnet_db::repositories::{GroupRepo, UserRepo};
use sonnet_events::bus::event_types;
use sonnet_events::PlatformEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for member add/remove on a group.
#[derive(Debug, Deserialize)]
pub struct MemberInput {
    pub user_id: DbId,
}

/// GET /api/v1/groups
pub async fn list(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Group>>>> {
    let groups = GroupRepo::list_for_user(&state.pool, auth_user.user_id).await?;
    Ok(Json(DataResponse::new(groups)))
}

/// POST /api/v1/groups
///
/// The creator becomes owner and first member in one transaction.
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<CreateGroup>,
) -> AppResult<(StatusCode, Json<DataResponse<Group>>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Group name must not be empty".into(),
        )));
    }

    let group = GroupRepo::create(&state.pool, auth_user.user_id, &input).await?;

    state.event_bus.publish(
        PlatformEvent::new(event_types::GROUP_CREATED)
            .with_source("group", group.id)
            .with_actor(auth_user.user_id)
            .with_payload(json!({ "name": group.name })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse::new(group))))
}

/// GET /api/v1/groups/{id}
///
/// Members only.
pub async fn get(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Group>>> {
    let group = find_or_404(&state, id).await?;
    if !GroupRepo::is_member(&state.pool, id, auth_user.user_id).await? {
        return Err(AppError::Core(CoreError::Forbidden(
            "You are not a member of this group".into(),
        )));
    }
    Ok(Json(DataResponse::new(group)))
}

/// PUT /api/v1/groups/{id}
///
/// Owner only.
pub async fn update(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateGroup>,
) -> AppResult<Json<DataResponse<Group>>> {
    require_owner(&state, id, auth_user.user_id).await?;

    let group = GroupRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "group", id }))?;
    Ok(Json(DataResponse::new(group)))
}

/// DELETE /api/v1/groups/{id}
///
/// Owner only. Returns 204 No Content.
pub async fn delete(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    require_owner(&state, id, auth_user.user_id).await?;
    GroupRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/groups/{id}/members
pub async fn list_members(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<GroupMember>>>> {
    find_or_404(&state, id).await?;
    if !GroupRepo::is_member(&state.pool, id, auth_user.user_id).await? {
        return Err(AppError::Core(CoreError::Forbidden(
            "You are not a member of this group".into(),
        )));
    }
    let members = GroupRepo::list_members(&state.pool, id).await?;
    Ok(Json(DataResponse::new(members)))
}

/// POST /api/v1/groups/{id}/members
///
/// Owner only. The added user must exist.
pub async fn add_member(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<MemberInput>,
) -> AppResult<(StatusCode, Json<DataResponse<GroupMember>>)> {
    require_owner(&state, id, auth_user.user_id).await?;

    if UserRepo::find_by_id(&state.pool, input.user_id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "user",
            id: input.user_id,
        }));
    }

    let member = GroupRepo::add_member(&state.pool, id, input.user_id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(member))))
}

/// DELETE /api/v1/groups/{id}/members
///
/// The owner can remove anyone but themselves; members can leave.
pub async fn remove_member(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<MemberInput>,
) -> AppResult<StatusCode> {
    let group = find_or_404(&state, id).await?;

    if input.user_id == group.owner_id {
        return Err(AppError::Core(CoreError::Validation(
            "The owner cannot leave their own group".into(),
        )));
    }
    if group.owner_id != auth_user.user_id && input.user_id != auth_user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the owner can remove other members".into(),
        )));
    }

    let removed = GroupRepo::remove_member(&state.pool, id, input.user_id).await?;
    if !removed {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "group_member",
            id: input.user_id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn find_or_404(state: &AppState, id: DbId) -> AppResult<Group> {
    GroupRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "group", id }))
}

async fn require_owner(state: &AppState, id: DbId, user_id: DbId) -> AppResult<Group> {
    let group = find_or_404(state, id).await?;
    if group.owner_id != user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the group owner can do this".into(),
        )));
    }
    Ok(group)
}
