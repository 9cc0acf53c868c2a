//! Platform fee models.
//!
//! A fee row is the commission a seller owes the platform for one completed
//! purchase. Fees are created when a purchase reaches COMPLETED and marked
//! paid by an admin once the seller settles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a fee record from the database.
///
/// `purchase_id` is unique: completing a purchase twice cannot double-bill
/// the seller.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Fee {
    pub id: Uuid,
    pub purchase_id: Uuid,
    pub seller_id: Uuid,
    pub amount_cents: i64,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

/// Query parameters for the admin fee list.
#[derive(Debug, Deserialize)]
pub struct FeeQuery {
    /// When true, only unpaid fees are returned
    pub unpaid: Option<bool>,
}
