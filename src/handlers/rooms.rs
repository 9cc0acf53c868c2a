//! Messaging room HTTP handlers.
//!
//! This module implements the buyer/seller chat API endpoints:
//! - GET /api/v1/rooms - List own rooms with last-message previews
//! - GET /api/v1/rooms/:id/messages - Message history (members only)
//! - POST /api/v1/rooms/:id/messages - Send a message (members only)
//!
//! Rooms are created by the purchase service; there is no endpoint for
//! creating one directly.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    db::AppState,
    error::AppError,
    middleware::auth::AuthContext,
    models::notification::NotificationKind,
    models::room::{Message, MessageQuery, MessageResponse, Room, RoomSummary, SendMessageRequest},
    services::notification_service,
};

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;
const MAX_MESSAGE_LEN: usize = 2000;

/// List the caller's rooms, most recently active first.
///
/// # Response (200)
///
/// ```json
/// [
///   {
///     "id": "990e8400-...",
///     "purchase_id": "770e8400-...",
///     "order_number": "ORD-260829-X7K2QD",
///     "buyer_id": "550e8400-...",
///     "seller_id": "660e8400-...",
///     "last_message": "See you at the venue entrance",
///     "last_message_at": "2026-08-29T16:05:00Z",
///     "created_at": "2026-08-29T16:00:00Z"
///   }
/// ]
/// ```
///
/// `last_message` is NULL for rooms with no messages yet.
pub async fn list_rooms(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<RoomSummary>>, AppError> {
    let rooms = sqlx::query_as::<_, RoomSummary>(
        r#"
        SELECT r.id, r.purchase_id, p.order_number, r.buyer_id, r.seller_id,
               m.body AS last_message, m.created_at AS last_message_at, r.created_at
        FROM rooms r
        JOIN purchases p ON p.id = r.purchase_id
        LEFT JOIN LATERAL (
            SELECT body, created_at FROM messages
            WHERE room_id = r.id
            ORDER BY created_at DESC
            LIMIT 1
        ) m ON TRUE
        WHERE r.buyer_id = $1 OR r.seller_id = $1
        ORDER BY COALESCE(m.created_at, r.created_at) DESC
        "#,
    )
    .bind(auth.user_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(rooms))
}

/// Get a room's message history, oldest first.
///
/// # Query Parameters
///
/// - `limit` (default 50, max 200) / `offset`
///
/// # Security
///
/// Members only. A caller who is in neither seat gets 403; an unknown
/// room id gets 404.
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(room_id): Path<Uuid>,
    Query(query): Query<MessageQuery>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    let room = load_member_room(&state, room_id, auth.user_id).await?;

    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);

    let messages = sqlx::query_as::<_, Message>(
        r#"
        SELECT * FROM messages
        WHERE room_id = $1
        ORDER BY created_at ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(room.id)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

/// Send a message into a room.
///
/// # Request Body
///
/// ```json
/// { "body": "Still available?" }
/// ```
///
/// # Side Effects
///
/// The counterpart receives a best-effort SMS notification (subject to
/// the cooldown window).
///
/// # Errors
///
/// - **400**: body empty or over 2000 characters after trimming
/// - **403**: caller is not a member of the room
pub async fn send_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(room_id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let body = request.body.trim();
    if !body_len_ok(body) {
        return Err(AppError::InvalidRequest(
            "Message body must be 1 to 2000 characters".to_string(),
        ));
    }

    let room = load_member_room(&state, room_id, auth.user_id).await?;

    let message = sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO messages (room_id, sender_id, body)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(room.id)
    .bind(auth.user_id)
    .bind(body)
    .fetch_one(&state.pool)
    .await?;

    let counterpart = if auth.user_id == room.buyer_id {
        room.seller_id
    } else {
        room.buyer_id
    };

    notification_service::notify(
        &state,
        counterpart,
        NotificationKind::Message,
        &format!("New message from {}", auth.nickname),
    )
    .await;

    Ok((StatusCode::CREATED, Json(MessageResponse::from(message))))
}

/// Load a room and require the caller to be one of its two members.
///
/// 404 for unknown rooms, 403 for rooms the caller is not in.
async fn load_member_room(
    state: &AppState,
    room_id: Uuid,
    user_id: Uuid,
) -> Result<Room, AppError> {
    let room = sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = $1")
        .bind(room_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::RoomNotFound)?;

    if room.buyer_id != user_id && room.seller_id != user_id {
        return Err(AppError::Forbidden);
    }

    Ok(room)
}

/// Message bodies are limited by character count, matching the
/// `char_length` constraint on `messages.body`.
fn body_len_ok(body: &str) -> bool {
    (1..=MAX_MESSAGE_LEN).contains(&body.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_limit_counts_characters_not_bytes() {
        // 700 Korean characters is 2100 bytes but well within 2000 chars
        assert!(body_len_ok(&"안".repeat(700)));
        assert!(body_len_ok(&"안".repeat(2000)));
        assert!(!body_len_ok(&"안".repeat(2001)));
    }

    #[test]
    fn body_must_be_non_empty() {
        assert!(!body_len_ok(""));
        assert!(body_len_ok("ok"));
    }
}
