//! Handlers for the `/messages` resource (direct messages).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sonnet_core::error::CoreError;
use sonnet_core::types::DbId;
use sonnet_db::models::message::{CreateMessage, Message};
use sonnet_db::repositories::{FriendshipRepo, MessageRepo, UserRepo};
use sonnet_events::bus::event_types;
use sonnet_events::PlatformEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default and maximum page size for message listings.
const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

/// Maximum message body length in characters.
const MAX_BODY_CHARS: usize = 4000;

/// Pagination parameters shared by the listing endpoints.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
}

/// Response body for `GET /messages/unread-count`.
#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub unread: i64,
}

/// GET /api/v1/messages
///
/// The user's inbox, newest first.
pub async fn inbox(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<Vec<Message>>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let messages = MessageRepo::list_inbox(&state.pool, auth_user.user_id, limit).await?;
    Ok(Json(DataResponse::new(messages)))
}

/// POST /api/v1/messages
///
/// Send a direct message. Only accepted friends can message each other.
pub async fn send(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<CreateMessage>,
) -> AppResult<(StatusCode, Json<DataResponse<Message>>)> {
    let body = input.body.trim();
    if body.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Message body must not be empty".into(),
        )));
    }
    if body.chars().count() > MAX_BODY_CHARS {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Message body must be at most {MAX_BODY_CHARS} characters"
        ))));
    }
    if input.recipient_id == auth_user.user_id {
        return Err(AppError::Core(CoreError::Validation(
            "You cannot message yourself".into(),
        )));
    }
    if UserRepo::find_by_id(&state.pool, input.recipient_id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "user",
            id: input.recipient_id,
        }));
    }
    if !FriendshipRepo::are_friends(&state.pool, auth_user.user_id, input.recipient_id).await? {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only message friends".into(),
        )));
    }

    let message =
        MessageRepo::create(&state.pool, auth_user.user_id, input.recipient_id, body).await?;

    state.event_bus.publish(
        PlatformEvent::new(event_types::MESSAGE_CREATED)
            .with_source("message", message.id)
            .with_actor(auth_user.user_id)
            .with_payload(json!({ "recipient_id": message.recipient_id })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse::new(message))))
}

/// GET /api/v1/messages/with/{user_id}
///
/// The two-way conversation with another user, oldest first.
pub async fn conversation(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(other_id): Path<DbId>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<Vec<Message>>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let messages =
        MessageRepo::list_conversation(&state.pool, auth_user.user_id, other_id, limit).await?;
    Ok(Json(DataResponse::new(messages)))
}

/// POST /api/v1/messages/{id}/read
///
/// Mark a received message as read. Returns 204 No Content; marking an
/// already-read message again is a 404.
pub async fn mark_read(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let marked = MessageRepo::mark_read(&state.pool, id, auth_user.user_id).await?;
    if !marked {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "message",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/messages/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<UnreadCount>>> {
    let unread = MessageRepo::count_unread(&state.pool, auth_user.user_id).await?;
    Ok(Json(DataResponse::new(UnreadCount { unread })))
}
