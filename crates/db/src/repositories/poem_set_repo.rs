//! Repository for the `poem_sets` table.

use sqlx::PgPool;
use sonnet_core::poem::PoemSetDoc;
use sonnet_core::types::DbId;

use crate::models::poem_set::{CreatePoemSet, PoemSet, UpdatePoemSet};

/// Column list for `poem_sets` queries.
const COLUMNS: &str = "id, user_id, group_id, title, tags, poems, status, is_public, \
                        allow_collaboration, created_at, updated_at";

/// Provides CRUD operations for poem sets.
pub struct PoemSetRepo;

impl PoemSetRepo {
    /// Insert a new poem set owned by `user_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreatePoemSet,
    ) -> Result<PoemSet, sqlx::Error> {
        let poems = serde_json::to_value(&input.poems)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        let query = format!(
            "INSERT INTO poem_sets (user_id, group_id, title, tags, poems, is_public, allow_collaboration)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PoemSet>(&query)
            .bind(user_id)
            .bind(input.group_id)
            .bind(&input.title)
            .bind(&input.tags)
            .bind(poems)
            .bind(input.is_public)
            .bind(input.allow_collaboration)
            .fetch_one(pool)
            .await
    }

    /// Find a poem set by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PoemSet>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM poem_sets WHERE id = $1");
        sqlx::query_as::<_, PoemSet>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every set a user can open: owned sets plus sets they
    /// collaborate on, most recently updated first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<PoemSet>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM poem_sets
             WHERE user_id = $1
                OR id IN (SELECT poem_set_id FROM poem_set_collaborators WHERE user_id = $1)
             ORDER BY updated_at DESC"
        );
        sqlx::query_as::<_, PoemSet>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List published public sets, most recently updated first.
    pub async fn list_public(pool: &PgPool, limit: i64) -> Result<Vec<PoemSet>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM poem_sets
             WHERE is_public = true AND status = 'published'
             ORDER BY updated_at DESC
             LIMIT $1"
        );
        sqlx::query_as::<_, PoemSet>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Update a poem set. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePoemSet,
    ) -> Result<Option<PoemSet>, sqlx::Error> {
        let poems = match &input.poems {
            Some(poems) => Some(
                serde_json::to_value(poems).map_err(|e| sqlx::Error::Encode(Box::new(e)))?,
            ),
            None => None,
        };
        let query = format!(
            "UPDATE poem_sets SET
                title = COALESCE($2, title),
                tags = COALESCE($3, tags),
                poems = COALESCE($4, poems),
                is_public = COALESCE($5, is_public),
                allow_collaboration = COALESCE($6, allow_collaboration),
                group_id = COALESCE($7, group_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PoemSet>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.tags)
            .bind(poems)
            .bind(input.is_public)
            .bind(input.allow_collaboration)
            .bind(input.group_id)
            .fetch_optional(pool)
            .await
    }

    /// Replace the full editing document (title, tags, and all poems) in
    /// one write. This is the autosave / manual save path.
    pub async fn save_doc(
        pool: &PgPool,
        id: DbId,
        doc: &PoemSetDoc,
    ) -> Result<Option<PoemSet>, sqlx::Error> {
        let poems = serde_json::to_value(&doc.poems)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        let query = format!(
            "UPDATE poem_sets SET title = $2, tags = $3, poems = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PoemSet>(&query)
            .bind(id)
            .bind(&doc.title)
            .bind(&doc.tags)
            .bind(poems)
            .fetch_optional(pool)
            .await
    }

    /// Set the status column (draft/published).
    ///
    /// Returns the updated row, or `None` if the set does not exist.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<PoemSet>, sqlx::Error> {
        let query = format!(
            "UPDATE poem_sets SET status = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PoemSet>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Delete a poem set. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM poem_sets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns `true` if the user owns the set or is a collaborator on a
    /// set that allows collaboration.
    pub async fn can_edit(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let (found,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM poem_sets ps
                WHERE ps.id = $1
                  AND (ps.user_id = $2
                       OR (ps.allow_collaboration
                           AND EXISTS (SELECT 1 FROM poem_set_collaborators c
                                       WHERE c.poem_set_id = ps.id AND c.user_id = $2)))
             )",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(found)
    }
}
