//! User report models.
//!
//! Reports flag a user (optionally a specific listing) for admin review.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Report status values stored in the `status` column.
pub mod status {
    pub const OPEN: &str = "open";
    pub const RESOLVED: &str = "resolved";
}

/// Represents a report record from the database.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Report {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub reported_user_id: Uuid,
    pub listing_id: Option<Uuid>,
    pub reason: String,

    /// "open" or "resolved"
    pub status: String,

    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Request to file a report.
///
/// # Validation
///
/// - Reason must be non-empty, at most 1000 characters
/// - Self-reporting is rejected
#[derive(Debug, Deserialize)]
pub struct CreateReportRequest {
    pub reported_user_id: Uuid,
    pub listing_id: Option<Uuid>,
    pub reason: String,
}

/// Query parameters for the admin report list.
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    /// Filter by "open" or "resolved"; unset returns all
    pub status: Option<String>,
}
