//! Rating models.
//!
//! After a purchase is confirmed, either party may leave one rating for the
//! other. Uniqueness of (purchase_id, rater_id) is a database constraint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a rating record from the database.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Rating {
    pub id: Uuid,
    pub purchase_id: Uuid,
    pub rater_id: Uuid,
    pub ratee_id: Uuid,

    /// 1 to 5 (CHECK constraint)
    pub score: i32,

    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request to rate the counterpart of a confirmed purchase.
///
/// # JSON Example
///
/// ```json
/// { "purchase_id": "550e8400-...", "score": 5, "comment": "smooth deal" }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateRatingRequest {
    pub purchase_id: Uuid,
    pub score: i32,
    pub comment: Option<String>,
}

/// Ratings for one user plus their average, as returned by
/// `GET /api/v1/users/{id}/ratings`.
#[derive(Debug, Serialize)]
pub struct UserRatingsResponse {
    pub average: Option<f64>,
    pub count: i64,
    pub ratings: Vec<Rating>,
}
