//! Repository for the `groups` and `group_members` tables.

use sqlx::PgPool;
use sonnet_core::types::DbId;

use crate::models::group::{CreateGroup, Group, GroupMember, UpdateGroup};

/// Column list for `groups` queries.
const GROUP_COLUMNS: &str = "id, name, description, owner_id, created_at, updated_at";

/// Column list for `group_members` queries.
const MEMBER_COLUMNS: &str = "id, group_id, user_id, role, created_at";

/// Provides CRUD operations for groups and their memberships.
pub struct GroupRepo;

impl GroupRepo {
    /// Create a group and add the owner as its first member, atomically.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateGroup,
    ) -> Result<Group, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO groups (name, description, owner_id)
             VALUES ($1, $2, $3)
             RETURNING {GROUP_COLUMNS}"
        );
        let group = sqlx::query_as::<_, Group>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(owner_id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO group_members (group_id, user_id, role) VALUES ($1, $2, 'owner')")
            .bind(group.id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(group)
    }

    /// Find a group by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Group>, sqlx::Error> {
        let query = format!("SELECT {GROUP_COLUMNS} FROM groups WHERE id = $1");
        sqlx::query_as::<_, Group>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List groups a user belongs to, most recently created first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Group>, sqlx::Error> {
        let query = format!(
            "SELECT {GROUP_COLUMNS} FROM groups
             WHERE id IN (SELECT group_id FROM group_members WHERE user_id = $1)
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Group>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Update a group. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateGroup,
    ) -> Result<Option<Group>, sqlx::Error> {
        let query = format!(
            "UPDATE groups SET
                name = COALESCE($2, name),
                description = COALESCE($3, description)
             WHERE id = $1
             RETURNING {GROUP_COLUMNS}"
        );
        sqlx::query_as::<_, Group>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete a group. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Add a member to a group.
    pub async fn add_member(
        pool: &PgPool,
        group_id: DbId,
        user_id: DbId,
    ) -> Result<GroupMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO group_members (group_id, user_id)
             VALUES ($1, $2)
             RETURNING {MEMBER_COLUMNS}"
        );
        sqlx::query_as::<_, GroupMember>(&query)
            .bind(group_id)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Remove a member from a group. Returns `true` if a row was deleted.
    pub async fn remove_member(
        pool: &PgPool,
        group_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND user_id = $2")
                .bind(group_id)
                .bind(user_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List the members of a group in join order.
    pub async fn list_members(
        pool: &PgPool,
        group_id: DbId,
    ) -> Result<Vec<GroupMember>, sqlx::Error> {
        let query = format!(
            "SELECT {MEMBER_COLUMNS} FROM group_members WHERE group_id = $1 ORDER BY created_at"
        );
        sqlx::query_as::<_, GroupMember>(&query)
            .bind(group_id)
            .fetch_all(pool)
            .await
    }

    /// Returns `true` if the user is a member of the group.
    pub async fn is_member(pool: &PgPool, group_id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let (found,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM group_members WHERE group_id = $1 AND user_id = $2)",
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(found)
    }
}
