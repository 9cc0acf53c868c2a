//! Listing (ticket post) models and API request/response types.
//!
//! A listing is either a ticket for sale (`kind = "sell"`) or a request to
//! buy (`kind = "buy"`). Listings move through a small status lifecycle:
//! `active` → `reserved` (a purchase is pending) → `sold`, or `active` →
//! `deleted` (soft delete by the seller).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Listing status values stored in the `status` column.
pub mod status {
    pub const ACTIVE: &str = "active";
    pub const RESERVED: &str = "reserved";
    pub const SOLD: &str = "sold";
    pub const DELETED: &str = "deleted";
}

/// Represents a listing record from the database.
///
/// # Database Table
///
/// Maps to the `listings` table. Prices are integer cents
/// (never floats), matching the CHECK constraint `price_cents > 0`.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Listing {
    pub id: Uuid,
    pub seller_id: Uuid,

    /// "sell" (offering tickets) or "buy" (requesting tickets)
    pub kind: String,

    pub title: String,
    pub description: Option<String>,

    /// Name of the concert/game/show the tickets are for
    pub event_name: String,

    /// When the event takes place (optional: sellers don't always know)
    pub event_date: Option<DateTime<Utc>>,

    pub venue: Option<String>,

    pub price_cents: i64,
    pub quantity: i32,

    /// One of the `status` module constants
    pub status: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a new listing.
///
/// # JSON Example
///
/// ```json
/// {
///   "kind": "sell",
///   "title": "2 tickets, floor seats",
///   "event_name": "Example Tour 2026",
///   "event_date": "2026-09-12T19:00:00Z",
///   "venue": "Olympic Hall",
///   "price_cents": 120000,
///   "quantity": 2
/// }
/// ```
///
/// # Validation
///
/// - `kind` must be "sell" or "buy"
/// - `price_cents` and `quantity` must be positive
/// - `title` and `event_name` must be non-empty, at most 200 characters
#[derive(Debug, Deserialize)]
pub struct CreateListingRequest {
    pub kind: String,
    pub title: String,
    pub description: Option<String>,
    pub event_name: String,
    pub event_date: Option<DateTime<Utc>>,
    pub venue: Option<String>,
    pub price_cents: i64,
    pub quantity: i32,
}

/// Request to update an existing listing. Only provided fields change,
/// and only while the listing is still `active`.
#[derive(Debug, Deserialize)]
pub struct UpdateListingRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_name: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub venue: Option<String>,
    pub price_cents: Option<i64>,
    pub quantity: Option<i32>,
}

/// Query parameters for listing search.
///
/// # Example
///
/// `GET /api/v1/listings?q=olympic&kind=sell&limit=20&offset=0`
#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    /// Case-insensitive substring match on title and event name
    pub q: Option<String>,

    /// Filter by "sell" or "buy"
    pub kind: Option<String>,

    /// Filter by status; defaults to "active". Deleted listings are
    /// never returned regardless of this filter.
    pub status: Option<String>,

    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Listing as returned to clients.
#[derive(Debug, Serialize)]
pub struct ListingResponse {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub kind: String,
    pub title: String,
    pub description: Option<String>,
    pub event_name: String,
    pub event_date: Option<DateTime<Utc>>,
    pub venue: Option<String>,
    pub price_cents: i64,
    pub quantity: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Listing> for ListingResponse {
    fn from(listing: Listing) -> Self {
        Self {
            id: listing.id,
            seller_id: listing.seller_id,
            kind: listing.kind,
            title: listing.title,
            description: listing.description,
            event_name: listing.event_name,
            event_date: listing.event_date,
            venue: listing.venue,
            price_cents: listing.price_cents,
            quantity: listing.quantity,
            status: listing.status,
            created_at: listing.created_at,
        }
    }
}
