//! Repository for the `events` table.

use sqlx::PgPool;
use sonnet_core::types::DbId;

use crate::models::event::Event;

/// Column list for `events` queries.
const COLUMNS: &str =
    "id, event_type, source_entity_type, source_entity_id, actor_user_id, payload, created_at";

/// Provides append/read operations for the durable event log.
pub struct EventRepo;

impl EventRepo {
    /// Append one event to the log, returning the new row id.
    pub async fn insert(
        pool: &PgPool,
        event_type: &str,
        source_entity_type: Option<&str>,
        source_entity_id: Option<DbId>,
        actor_user_id: Option<DbId>,
        payload: &serde_json::Value,
    ) -> Result<DbId, sqlx::Error> {
        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO events (event_type, source_entity_type, source_entity_id, actor_user_id, payload)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(event_type)
        .bind(source_entity_type)
        .bind(source_entity_id)
        .bind(actor_user_id)
        .bind(payload)
        .fetch_one(pool)
        .await?;
        Ok(id)
    }

    /// List the most recent events for an entity, newest first.
    pub async fn list_for_entity(
        pool: &PgPool,
        entity_type: &str,
        entity_id: DbId,
        limit: i64,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events
             WHERE source_entity_type = $1 AND source_entity_id = $2
             ORDER BY created_at DESC
             LIMIT $3"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(entity_type)
            .bind(entity_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
