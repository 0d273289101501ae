//! Group and group membership models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sonnet_core::types::{DbId, Timestamp};

/// A row from the `groups` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Group {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `group_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GroupMember {
    pub id: DbId,
    pub group_id: DbId,
    pub user_id: DbId,
    pub role: String,
    pub created_at: Timestamp,
}

/// DTO for creating a group.
#[derive(Debug, Deserialize)]
pub struct CreateGroup {
    pub name: String,
    pub description: Option<String>,
}

/// DTO for updating a group. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateGroup {
    pub name: Option<String>,
    pub description: Option<String>,
}
