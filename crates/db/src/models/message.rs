//! Direct message model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sonnet_core::types::{DbId, Timestamp};

/// A row from the `messages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Message {
    pub id: DbId,
    pub sender_id: DbId,
    pub recipient_id: DbId,
    pub body: String,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for sending a message.
#[derive(Debug, Deserialize)]
pub struct CreateMessage {
    pub recipient_id: DbId,
    pub body: String,
}
