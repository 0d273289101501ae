//! WebSocket upgrade handler for poem set channels.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use sonnet_core::collab::{is_valid_sonnet_index, ChannelMessage, PresenceEntry};
use sonnet_core::error::CoreError;
use sonnet_core::types::DbId;
use sonnet_db::repositories::{PoemSetRepo, UserRepo};

use crate::auth::jwt::validate_token;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::ws::hub::ChannelHub;

/// Query parameters for the WebSocket upgrade request.
///
/// Browsers cannot set headers on WebSocket requests, so the access token
/// arrives as a query parameter instead of an `Authorization` header.
#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: String,
}

/// GET /api/v1/ws/poem-sets/{id}?token=...
///
/// Authenticates, authorizes against the poem set (owner, collaborator,
/// or public), then upgrades the connection and joins the set's channel.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(poem_set_id): Path<DbId>,
    Query(params): Query<WsParams>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let claims = validate_token(&params.token, &state.config.jwt)
        .map_err(|_| AppError::Core(CoreError::Unauthorized("Invalid or expired token".into())))?;

    let user = UserRepo::find_by_id(&state.pool, claims.sub)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    let poem_set = PoemSetRepo::find_by_id(&state.pool, poem_set_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "poem_set",
            id: poem_set_id,
        }))?;

    let can_edit = PoemSetRepo::can_edit(&state.pool, poem_set_id, user.id).await?;
    if !can_edit && !poem_set.is_public {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not have access to this poem set".into(),
        )));
    }

    let entry = PresenceEntry {
        user_id: user.id,
        user_name: user.display_name.unwrap_or(user.username),
        user_avatar: user.avatar_url,
        editing_sonnet: None,
        online_at: chrono::Utc::now(),
    };

    Ok(ws.on_upgrade(move |socket| {
        handle_socket(socket, state.channel_hub, poem_set_id, entry)
    }))
}

/// Manage a single channel connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Joins the poem set channel (fans out a presence sync).
///   2. Spawns a sender task forwarding hub messages to the sink.
///   3. Relays inbound protocol messages on the current task.
///   4. Leaves the channel on disconnect (presence leave + sync).
async fn handle_socket(
    socket: WebSocket,
    hub: Arc<ChannelHub>,
    poem_set_id: DbId,
    entry: PresenceEntry,
) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    let user_id = entry.user_id;
    tracing::info!(conn_id = %conn_id, poem_set_id, user_id, "Channel connected");

    let mut rx = hub.join(poem_set_id, conn_id.clone(), entry).await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward hub messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Receiver loop: relay inbound protocol messages to the channel.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Text(text)) => {
                match serde_json::from_str::<ChannelMessage>(&text) {
                    Ok(msg) => {
                        dispatch_inbound(&hub, poem_set_id, &conn_id, user_id, msg).await;
                    }
                    Err(e) => {
                        tracing::debug!(conn_id = %conn_id, error = %e, "Unparseable channel message");
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    hub.leave(poem_set_id, &conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, poem_set_id, user_id, "Channel disconnected");
}

/// Route one inbound client message.
///
/// Presence updates replace the connection's entry; lock and typing
/// events are relayed to the whole channel. Messages claiming another
/// user's identity or an out-of-range sonnet index are dropped.
async fn dispatch_inbound(
    hub: &ChannelHub,
    poem_set_id: DbId,
    conn_id: &str,
    user_id: DbId,
    msg: ChannelMessage,
) {
    match msg {
        ChannelMessage::PresenceState { entry } => {
            if entry.user_id != user_id {
                tracing::warn!(conn_id = %conn_id, "Presence entry for another user dropped");
                return;
            }
            hub.update_presence(poem_set_id, conn_id, entry).await;
        }
        ChannelMessage::LockSonnet { ref lock } => {
            if lock.user_id != user_id || !is_valid_sonnet_index(lock.sonnet_index) {
                return;
            }
            hub.broadcast(poem_set_id, &msg).await;
        }
        ChannelMessage::UnlockSonnet {
            sonnet_index,
            user_id: sender,
        } => {
            if sender != user_id || !is_valid_sonnet_index(sonnet_index) {
                return;
            }
            hub.broadcast(poem_set_id, &msg).await;
        }
        ChannelMessage::Typing {
            sonnet_index,
            user_id: sender,
        } => {
            if sender != user_id || !is_valid_sonnet_index(sonnet_index) {
                return;
            }
            hub.broadcast(poem_set_id, &msg).await;
        }
        // Sync, leave, and document updates originate server-side only.
        ChannelMessage::PresenceSync { .. }
        | ChannelMessage::PresenceLeave { .. }
        | ChannelMessage::DocUpdated { .. } => {}
    }
}
