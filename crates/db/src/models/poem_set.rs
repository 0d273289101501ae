//! Poem set entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sonnet_core::poem::{Poem, PoemSetDoc};
use sonnet_core::types::{DbId, Timestamp};

/// A row from the `poem_sets` table.
///
/// `poems` is the JSONB array of ten sonnets; title and tags live in their
/// own columns. Use [`PoemSet::doc`] to reassemble the editing document.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PoemSet {
    pub id: DbId,
    pub user_id: DbId,
    pub group_id: Option<DbId>,
    pub title: String,
    pub tags: Vec<String>,
    pub poems: serde_json::Value,
    pub status: String,
    pub is_public: bool,
    pub allow_collaboration: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PoemSet {
    /// Reassemble the in-memory editing document from this row.
    ///
    /// Fails only if the stored JSONB does not decode as a poem array,
    /// which indicates row corruption rather than a user error.
    pub fn doc(&self) -> Result<PoemSetDoc, serde_json::Error> {
        let poems: Vec<Poem> = serde_json::from_value(self.poems.clone())?;
        Ok(PoemSetDoc {
            title: self.title.clone(),
            tags: self.tags.clone(),
            poems,
        })
    }
}

/// DTO for creating a poem set.
#[derive(Debug, Deserialize)]
pub struct CreatePoemSet {
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub poems: Vec<Poem>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub allow_collaboration: bool,
    pub group_id: Option<DbId>,
}

/// DTO for updating a poem set. All fields are optional; `poems` replaces
/// the whole document when present (the autosave path writes full docs).
#[derive(Debug, Deserialize)]
pub struct UpdatePoemSet {
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
    pub poems: Option<Vec<Poem>>,
    pub is_public: Option<bool>,
    pub allow_collaboration: Option<bool>,
    pub group_id: Option<DbId>,
}
