//! Handlers for the `/poem-sets` resource: CRUD, publishing, the
//! combinatorial reader, and collaborator management.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sonnet_core::error::CoreError;
use sonnet_core::poem::{statuses, validate_for_publish, LINES_PER_SONNET};
use sonnet_core::reader::{assemble, Selection};
use sonnet_core::types::DbId;
use sonnet_db::models::collaborator::{AddCollaborator, Collaborator};
use sonnet_db::models::poem_set::{CreatePoemSet, PoemSet, UpdatePoemSet};
use sonnet_db::repositories::{CollaboratorRepo, PoemSetRepo, UserRepo};
use sonnet_events::bus::event_types;
use sonnet_events::PlatformEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default and maximum page size for the public listing.
const DEFAULT_PUBLIC_LIMIT: i64 = 50;
const MAX_PUBLIC_LIMIT: i64 = 100;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /poem-sets/public`.
#[derive(Debug, Deserialize)]
pub struct PublicListParams {
    pub limit: Option<i64>,
}

/// Query parameters for `GET /poem-sets/{id}/read`.
#[derive(Debug, Deserialize)]
pub struct ReadParams {
    /// 14-digit selection string, one sonnet index per line position.
    /// Omitted means the first sonnet read straight through.
    pub selection: Option<String>,
}

/// Response body for the combinatorial reader.
#[derive(Debug, Serialize)]
pub struct ReadingResponse {
    pub poem_set_id: DbId,
    pub title: String,
    /// The 14 assembled lines.
    pub lines: Vec<String>,
    /// The selection echoed back as a 14-digit string.
    pub selection: String,
    /// The selection's rank in `0..10^14`.
    pub rank: u64,
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/poem-sets
///
/// List every set the user owns or collaborates on.
pub async fn list(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<PoemSet>>>> {
    let sets = PoemSetRepo::list_for_user(&state.pool, auth_user.user_id).await?;
    Ok(Json(DataResponse::new(sets)))
}

/// GET /api/v1/poem-sets/public
///
/// List published public sets, newest first.
pub async fn list_public(
    State(state): State<AppState>,
    Query(params): Query<PublicListParams>,
) -> AppResult<Json<DataResponse<Vec<PoemSet>>>> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_PUBLIC_LIMIT)
        .clamp(1, MAX_PUBLIC_LIMIT);
    let sets = PoemSetRepo::list_public(&state.pool, limit).await?;
    Ok(Json(DataResponse::new(sets)))
}

/// POST /api/v1/poem-sets
///
/// Create a draft set. The document is not validated here; structure is
/// only enforced at publish time.
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<CreatePoemSet>,
) -> AppResult<(StatusCode, Json<DataResponse<PoemSet>>)> {
    let set = PoemSetRepo::create(&state.pool, auth_user.user_id, &input).await?;

    state.event_bus.publish(
        PlatformEvent::new(event_types::POEM_SET_CREATED)
            .with_source("poem_set", set.id)
            .with_actor(auth_user.user_id)
            .with_payload(json!({ "title": set.title })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse::new(set))))
}

/// GET /api/v1/poem-sets/{id}
pub async fn get(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PoemSet>>> {
    let set = find_readable(&state, id, auth_user.user_id).await?;
    Ok(Json(DataResponse::new(set)))
}

/// PUT /api/v1/poem-sets/{id}
///
/// Partial update of a set. This is the save path used by both autosave
/// and manual saves, so it deliberately accepts incomplete documents; the
/// resulting full document is fanned out to open channels via the event
/// bus.
pub async fn update(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePoemSet>,
) -> AppResult<Json<DataResponse<PoemSet>>> {
    require_edit(&state, id, auth_user.user_id).await?;

    let set = PoemSetRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "poem_set",
            id,
        }))?;

    publish_doc_update(&state, &set, auth_user.user_id);

    Ok(Json(DataResponse::new(set)))
}

/// DELETE /api/v1/poem-sets/{id}
///
/// Owner only. Returns 204 No Content.
pub async fn delete(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let set = find_or_404(&state, id).await?;
    if set.user_id != auth_user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the owner can delete a poem set".into(),
        )));
    }

    PoemSetRepo::delete(&state.pool, id).await?;

    state.event_bus.publish(
        PlatformEvent::new(event_types::POEM_SET_DELETED)
            .with_source("poem_set", id)
            .with_actor(auth_user.user_id),
    );

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/poem-sets/{id}/publish
///
/// Validate the full 10x14 structure and freeze the set. Returns 400
/// naming the first failing sonnet or line when the structure is off.
pub async fn publish(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PoemSet>>> {
    let set = find_or_404(&state, id).await?;
    if set.user_id != auth_user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the owner can publish a poem set".into(),
        )));
    }

    let doc = set
        .doc()
        .map_err(|e| AppError::InternalError(format!("Stored document is corrupt: {e}")))?;
    validate_for_publish(&doc)
        .map_err(|issue| AppError::Core(CoreError::Validation(issue.to_string())))?;

    let set = PoemSetRepo::set_status(&state.pool, id, statuses::PUBLISHED)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "poem_set",
            id,
        }))?;

    state.event_bus.publish(
        PlatformEvent::new(event_types::POEM_SET_PUBLISHED)
            .with_source("poem_set", set.id)
            .with_actor(auth_user.user_id)
            .with_payload(json!({ "title": set.title })),
    );

    Ok(Json(DataResponse::new(set)))
}

// ---------------------------------------------------------------------------
// Combinatorial reader
// ---------------------------------------------------------------------------

/// GET /api/v1/poem-sets/{id}/read?selection=...
///
/// Assemble one of the 10^14 readings of a published set. The selection
/// is a 14-digit string choosing a source sonnet per line position.
pub async fn read(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Query(params): Query<ReadParams>,
) -> AppResult<Json<DataResponse<ReadingResponse>>> {
    let set = find_readable(&state, id, auth_user.user_id).await?;

    let selection = match params.selection.as_deref() {
        Some(s) => parse_selection(s).map_err(AppError::Core)?,
        None => Selection::default(),
    };

    let doc = set
        .doc()
        .map_err(|e| AppError::InternalError(format!("Stored document is corrupt: {e}")))?;
    let lines = assemble(&doc.poems, &selection)
        .map_err(AppError::Core)?
        .into_iter()
        .map(String::from)
        .collect();

    Ok(Json(DataResponse::new(ReadingResponse {
        poem_set_id: set.id,
        title: set.title,
        lines,
        selection: selection_string(&selection),
        rank: selection.rank(),
    })))
}

/// Parse a 14-digit selection string, one decimal digit per line position.
fn parse_selection(s: &str) -> Result<Selection, CoreError> {
    if s.len() != LINES_PER_SONNET || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::Validation(format!(
            "Selection must be exactly {LINES_PER_SONNET} digits"
        )));
    }
    let mut choices = [0u8; LINES_PER_SONNET];
    for (position, b) in s.bytes().enumerate() {
        choices[position] = b - b'0';
    }
    Selection::new(choices)
}

/// Render a selection back to its 14-digit string form.
fn selection_string(selection: &Selection) -> String {
    (0..LINES_PER_SONNET)
        .map(|position| {
            char::from_digit(selection.get(position).unwrap_or(0) as u32, 10).unwrap_or('0')
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// GET /api/v1/poem-sets/{id}/collaborators
pub async fn list_collaborators(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Collaborator>>>> {
    find_readable(&state, id, auth_user.user_id).await?;
    let collaborators = CollaboratorRepo::list_for_set(&state.pool, id).await?;
    Ok(Json(DataResponse::new(collaborators)))
}

/// POST /api/v1/poem-sets/{id}/collaborators
///
/// Owner only. The invited user must exist.
pub async fn add_collaborator(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<AddCollaborator>,
) -> AppResult<(StatusCode, Json<DataResponse<Collaborator>>)> {
    let set = find_or_404(&state, id).await?;
    if set.user_id != auth_user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the owner can invite collaborators".into(),
        )));
    }
    if UserRepo::find_by_id(&state.pool, input.user_id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "user",
            id: input.user_id,
        }));
    }

    let collaborator =
        CollaboratorRepo::add(&state.pool, id, input.user_id, auth_user.user_id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(collaborator))))
}

/// DELETE /api/v1/poem-sets/{id}/collaborators
///
/// The owner can remove anyone; a collaborator can remove themselves.
pub async fn remove_collaborator(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<AddCollaborator>,
) -> AppResult<StatusCode> {
    let set = find_or_404(&state, id).await?;
    if set.user_id != auth_user.user_id && input.user_id != auth_user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the owner can remove other collaborators".into(),
        )));
    }

    let removed = CollaboratorRepo::remove(&state.pool, id, input.user_id).await?;
    if !removed {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "collaborator",
            id: input.user_id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_or_404(state: &AppState, id: DbId) -> AppResult<PoemSet> {
    PoemSetRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "poem_set",
            id,
        }))
}

/// Load a set the user is allowed to view: editors always, everyone else
/// only when the set is public.
async fn find_readable(state: &AppState, id: DbId, user_id: DbId) -> AppResult<PoemSet> {
    let set = find_or_404(state, id).await?;
    if !set.is_public && !PoemSetRepo::can_edit(&state.pool, id, user_id).await? {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not have access to this poem set".into(),
        )));
    }
    Ok(set)
}

async fn require_edit(state: &AppState, id: DbId, user_id: DbId) -> AppResult<()> {
    find_or_404(state, id).await?;
    if !PoemSetRepo::can_edit(&state.pool, id, user_id).await? {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not have edit access to this poem set".into(),
        )));
    }
    Ok(())
}

/// Publish a `poem_set.updated` event carrying the full new document, so
/// open channels receive a `doc.updated` broadcast.
fn publish_doc_update(state: &AppState, set: &PoemSet, actor: DbId) {
    match set.doc() {
        Ok(doc) => state.event_bus.publish(
            PlatformEvent::new(event_types::POEM_SET_UPDATED)
                .with_source("poem_set", set.id)
                .with_actor(actor)
                .with_payload(json!({ "doc": doc })),
        ),
        Err(e) => {
            tracing::error!(poem_set_id = set.id, error = %e, "Could not decode saved document for fan-out");
        }
    }
}
