//! Poem set collaborator model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sonnet_core::types::{DbId, Timestamp};

/// A row from the `poem_set_collaborators` table. Collaborators may edit
/// the set and join its realtime channel.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Collaborator {
    pub id: DbId,
    pub poem_set_id: DbId,
    pub user_id: DbId,
    pub invited_by: DbId,
    pub created_at: Timestamp,
}

/// DTO for inviting a collaborator.
#[derive(Debug, Deserialize)]
pub struct AddCollaborator {
    pub user_id: DbId,
}
