//! Handler for muse-backed poem set generation.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use sonnet_db::models::poem_set::{CreatePoemSet, PoemSet};
use sonnet_db::repositories::PoemSetRepo;
use sonnet_events::bus::event_types;
use sonnet_events::PlatformEvent;
use sonnet_muse::prompt::build_description;
use sonnet_muse::GenerateRequest;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /poem-sets/generate`.
#[derive(Debug, Deserialize)]
pub struct GenerationInput {
    /// Theme tags steering the generation.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Optional free-form note folded into the description.
    pub note: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

/// POST /api/v1/poem-sets/generate
///
/// Ask the muse service for a complete 10x14 set and save it as a draft
/// owned by the caller. The generated document is structurally validated
/// by the client before it is persisted; a bad generation is a 502 and
/// nothing is saved.
pub async fn generate(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<GenerationInput>,
) -> AppResult<(StatusCode, Json<DataResponse<PoemSet>>)> {
    let description = build_description(&input.tags, input.note.as_deref());

    let doc = state
        .muse
        .generate(&GenerateRequest {
            tags: input.tags,
            description: Some(description),
        })
        .await?;

    let set = PoemSetRepo::create(
        &state.pool,
        auth_user.user_id,
        &CreatePoemSet {
            title: doc.title,
            tags: doc.tags,
            poems: doc.poems,
            is_public: input.is_public,
            allow_collaboration: false,
            group_id: None,
        },
    )
    .await?;

    tracing::info!(
        poem_set_id = set.id,
        user_id = auth_user.user_id,
        "Generated poem set saved as draft"
    );

    state.event_bus.publish(
        PlatformEvent::new(event_types::POEM_SET_CREATED)
            .with_source("poem_set", set.id)
            .with_actor(auth_user.user_id)
            .with_payload(json!({ "title": set.title, "generated": true })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse::new(set))))
}
