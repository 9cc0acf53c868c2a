//! Notification log models.
//!
//! Every attempted SMS is recorded in `notification_logs`; the same table
//! backs the per-(user, kind) cooldown window.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Notification kinds stored in the `kind` column. The cooldown applies
/// per recipient per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// A buyer started a purchase on the recipient's listing
    PurchaseCreated,
    /// The recipient's purchase was completed
    PurchaseCompleted,
    /// New chat message in one of the recipient's rooms
    Message,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::PurchaseCreated => "purchase_created",
            NotificationKind::PurchaseCompleted => "purchase_completed",
            NotificationKind::Message => "message",
        }
    }
}

/// Represents a notification log record from the database.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct NotificationLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub sent_at: DateTime<Utc>,
}
