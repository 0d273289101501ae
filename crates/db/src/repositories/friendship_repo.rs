//! Repository for the `friendships` table.

use sqlx::PgPool;
use sonnet_core::types::DbId;

use crate::models::friendship::{statuses, Friendship};

/// Column list for `friendships` queries.
const COLUMNS: &str = "id, requester_id, addressee_id, status, created_at, updated_at";

/// Provides friend-request operations.
pub struct FriendshipRepo;

impl FriendshipRepo {
    /// Send a friend request. Fails on the unique pair constraint if a
    /// request already exists in this direction.
    pub async fn create(
        pool: &PgPool,
        requester_id: DbId,
        addressee_id: DbId,
    ) -> Result<Friendship, sqlx::Error> {
        let query = format!(
            "INSERT INTO friendships (requester_id, addressee_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Friendship>(&query)
            .bind(requester_id)
            .bind(addressee_id)
            .fetch_one(pool)
            .await
    }

    /// Find a friendship row by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Friendship>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM friendships WHERE id = $1");
        sqlx::query_as::<_, Friendship>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all friendships involving a user, pending ones first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Friendship>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM friendships
             WHERE requester_id = $1 OR addressee_id = $1
             ORDER BY (status = 'pending') DESC, updated_at DESC"
        );
        sqlx::query_as::<_, Friendship>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Answer a pending request. Only the addressee can answer, and only
    /// while the request is still pending.
    ///
    /// Returns the updated row, or `None` if there was no matching pending
    /// request addressed to this user.
    pub async fn answer(
        pool: &PgPool,
        id: DbId,
        addressee_id: DbId,
        accept: bool,
    ) -> Result<Option<Friendship>, sqlx::Error> {
        let status = if accept {
            statuses::ACCEPTED
        } else {
            statuses::DECLINED
        };
        let query = format!(
            "UPDATE friendships SET status = $3
             WHERE id = $1 AND addressee_id = $2 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Friendship>(&query)
            .bind(id)
            .bind(addressee_id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Remove a friendship (either side may unfriend, or the requester may
    /// withdraw a pending request). Returns `true` if a row was deleted.
    pub async fn remove(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM friendships
             WHERE id = $1 AND (requester_id = $2 OR addressee_id = $2)",
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns `true` if the two users have an accepted friendship in
    /// either direction.
    pub async fn are_friends(pool: &PgPool, a: DbId, b: DbId) -> Result<bool, sqlx::Error> {
        let (found,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM friendships
                WHERE status = 'accepted'
                  AND ((requester_id = $1 AND addressee_id = $2)
                       OR (requester_id = $2 AND addressee_id = $1))
             )",
        )
        .bind(a)
        .bind(b)
        .fetch_one(pool)
        .await?;
        Ok(found)
    }
}
