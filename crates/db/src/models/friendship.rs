//! Friendship (friend request) model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sonnet_core::types::{DbId, Timestamp};

/// Known friendship statuses.
pub mod statuses {
    pub const PENDING: &str = "pending";
    pub const ACCEPTED: &str = "accepted";
    pub const DECLINED: &str = "declined";
}

/// A row from the `friendships` table. Directed: `requester_id` asked,
/// `addressee_id` answers.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Friendship {
    pub id: DbId,
    pub requester_id: DbId,
    pub addressee_id: DbId,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for sending a friend request.
#[derive(Debug, Deserialize)]
pub struct CreateFriendRequest {
    pub addressee_id: DbId,
}
