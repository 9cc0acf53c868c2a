//! User account models and API request/response types.
//!
//! This module defines:
//! - `User`: Database entity representing a registered user
//! - Request types for signup, login, and profile updates
//! - Response types that hide credential columns from clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a user record from the database.
///
/// # Database Table
///
/// Maps to the `users` table. Email and nickname are unique
/// (enforced by constraints).
///
/// # Credential Storage
///
/// `password_hash` has the format `"<salt-hex>$<digest-hex>"` where the
/// digest is SHA-256 over salt bytes followed by the password bytes.
/// It is never serialized into any API response.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub nickname: String,

    /// Phone number used for SMS notifications. Optional: users without a
    /// phone simply never receive SMS.
    pub phone: Option<String>,

    pub is_admin: bool,

    /// Suspended users keep their data but cannot authenticate.
    pub is_suspended: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a new account.
///
/// # JSON Example
///
/// ```json
/// {
///   "email": "buyer@example.com",
///   "password": "hunter22",
///   "nickname": "ticketfan",
///   "phone": "01012345678"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub nickname: String,
    pub phone: Option<String>,
}

/// Request to log in with email and password.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request to update the authenticated user's profile.
///
/// Only the provided fields are changed.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub nickname: Option<String>,
    pub phone: Option<String>,
}

/// The authenticated user's own profile.
///
/// Includes email and phone, which are never shown on public profiles.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub nickname: String,
    pub phone: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            nickname: user.nickname,
            phone: user.phone,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

/// A user as seen by other users: nickname plus rating summary.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": "550e8400-e29b-41d4-a716-446655440000",
///   "nickname": "ticketfan",
///   "rating_average": 4.5,
///   "rating_count": 12,
///   "created_at": "2025-06-01T10:00:00Z"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct PublicProfileResponse {
    pub id: Uuid,
    pub nickname: String,
    pub rating_average: Option<f64>,
    pub rating_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Successful login body. The same token is also mirrored into the
/// `session` and `access_token` cookies.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Admin view of a user, including contact columns and suspension state.
#[derive(Debug, Serialize)]
pub struct AdminUserResponse {
    pub id: Uuid,
    pub email: String,
    pub nickname: String,
    pub phone: Option<String>,
    pub is_admin: bool,
    pub is_suspended: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for AdminUserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            nickname: user.nickname,
            phone: user.phone,
            is_admin: user.is_admin,
            is_suspended: user.is_suspended,
            created_at: user.created_at,
        }
    }
}
