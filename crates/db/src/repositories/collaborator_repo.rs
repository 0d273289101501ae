//! Repository for the `poem_set_collaborators` table.

use sqlx::PgPool;
use sonnet_core::types::DbId;

use crate::models::collaborator::Collaborator;

/// Column list for `poem_set_collaborators` queries.
const COLUMNS: &str = "id, poem_set_id, user_id, invited_by, created_at";

/// Provides collaborator membership operations.
pub struct CollaboratorRepo;

impl CollaboratorRepo {
    /// Invite a user to collaborate on a poem set.
    pub async fn add(
        pool: &PgPool,
        poem_set_id: DbId,
        user_id: DbId,
        invited_by: DbId,
    ) -> Result<Collaborator, sqlx::Error> {
        let query = format!(
            "INSERT INTO poem_set_collaborators (poem_set_id, user_id, invited_by)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Collaborator>(&query)
            .bind(poem_set_id)
            .bind(user_id)
            .bind(invited_by)
            .fetch_one(pool)
            .await
    }

    /// Remove a collaborator. Returns `true` if a row was deleted.
    pub async fn remove(
        pool: &PgPool,
        poem_set_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM poem_set_collaborators WHERE poem_set_id = $1 AND user_id = $2",
        )
        .bind(poem_set_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List the collaborators of a poem set in invite order.
    pub async fn list_for_set(
        pool: &PgPool,
        poem_set_id: DbId,
    ) -> Result<Vec<Collaborator>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM poem_set_collaborators
             WHERE poem_set_id = $1
             ORDER BY created_at"
        );
        sqlx::query_as::<_, Collaborator>(&query)
            .bind(poem_set_id)
            .fetch_all(pool)
            .await
    }
}
