//! Purchase (order) models and API request/response types.
//!
//! A purchase links a buyer, a seller, and a listing, and carries the order
//! lifecycle:
//!
//! ```text
//! PENDING ──complete──▶ COMPLETED ──confirm──▶ CONFIRMED
//!    │
//!    └──cancel──▶ CANCELLED
//! ```
//!
//! Every transition happens inside a database transaction with the purchase
//! row locked, so concurrent transition requests serialize on the row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Purchase status values stored in the `status` column.
pub mod status {
    pub const PENDING: &str = "PENDING";
    pub const COMPLETED: &str = "COMPLETED";
    pub const CONFIRMED: &str = "CONFIRMED";
    pub const CANCELLED: &str = "CANCELLED";
}

/// Represents a purchase record from the database.
///
/// # Database Table
///
/// Maps to the `purchases` table. `order_number` is unique — the
/// constraint, not the generator, is what guarantees no two orders
/// share a code.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Purchase {
    pub id: Uuid,

    /// Human-facing order code, e.g. `ORD-260827-X7K2QD`. Also used as the
    /// payment id handed to the payment provider.
    pub order_number: String,

    pub listing_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,

    /// Price captured from the listing at purchase time
    pub price_cents: i64,

    /// One of the `status` module constants
    pub status: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to start a purchase.
///
/// # JSON Example
///
/// ```json
/// { "listing_id": "550e8400-e29b-41d4-a716-446655440000" }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreatePurchaseRequest {
    pub listing_id: Uuid,
}

/// Purchase as returned to clients.
#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
    pub id: Uuid,
    pub order_number: String,
    pub listing_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub price_cents: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Purchase> for PurchaseResponse {
    fn from(purchase: Purchase) -> Self {
        Self {
            id: purchase.id,
            order_number: purchase.order_number,
            listing_id: purchase.listing_id,
            buyer_id: purchase.buyer_id,
            seller_id: purchase.seller_id,
            price_cents: purchase.price_cents,
            status: purchase.status,
            created_at: purchase.created_at,
        }
    }
}
