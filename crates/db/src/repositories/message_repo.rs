//! Repository for the `messages` table.

use sqlx::PgPool;
use sonnet_core::types::DbId;

use crate::models::message::Message;

/// Column list for `messages` queries.
const COLUMNS: &str = "id, sender_id, recipient_id, body, read_at, created_at";

/// Provides direct-message operations.
pub struct MessageRepo;

impl MessageRepo {
    /// Insert a new message, returning the created row.
    pub async fn create(
        pool: &PgPool,
        sender_id: DbId,
        recipient_id: DbId,
        body: &str,
    ) -> Result<Message, sqlx::Error> {
        let query = format!(
            "INSERT INTO messages (sender_id, recipient_id, body)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(sender_id)
            .bind(recipient_id)
            .bind(body)
            .fetch_one(pool)
            .await
    }

    /// List a user's inbox, newest first.
    pub async fn list_inbox(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<Message>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM messages
             WHERE recipient_id = $1
             ORDER BY created_at DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// List the two-way conversation between two users, oldest first.
    pub async fn list_conversation(
        pool: &PgPool,
        user_id: DbId,
        other_id: DbId,
        limit: i64,
    ) -> Result<Vec<Message>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM messages
             WHERE (sender_id = $1 AND recipient_id = $2)
                OR (sender_id = $2 AND recipient_id = $1)
             ORDER BY created_at ASC, id ASC
             LIMIT $3"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(user_id)
            .bind(other_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Mark a message as read. Only the recipient may mark it, and a
    /// message is only marked once.
    ///
    /// Returns `true` if the row was updated.
    pub async fn mark_read(pool: &PgPool, id: DbId, recipient_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE messages SET read_at = NOW()
             WHERE id = $1 AND recipient_id = $2 AND read_at IS NULL",
        )
        .bind(id)
        .bind(recipient_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count unread messages for a user.
    pub async fn count_unread(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM messages WHERE recipient_id = $1 AND read_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}
