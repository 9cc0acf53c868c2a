//! Messaging room and message models.
//!
//! A room is the buyer/seller conversation thread for one purchase. Rooms
//! are created automatically when a purchase is created and are only
//! visible to their two members.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a room record from the database.
///
/// Maps to the `rooms` table; `purchase_id` is unique (one thread per order).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Room {
    pub id: Uuid,
    pub purchase_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Represents a message record from the database.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Message {
    pub id: Uuid,
    pub room_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Request to post a message into a room.
///
/// # Validation
///
/// Body must be 1 to 2000 characters after trimming.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub body: String,
}

/// Pagination parameters for the message history.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Room summary returned by the room list endpoint, including a preview of
/// the most recent message (NULL for rooms with no messages yet).
#[derive(Debug, sqlx::FromRow, Serialize)]
pub struct RoomSummary {
    pub id: Uuid,
    pub purchase_id: Uuid,
    pub order_number: String,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Message as returned to clients.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub room_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            room_id: message.room_id,
            sender_id: message.sender_id,
            body: message.body,
            created_at: message.created_at,
        }
    }
}
