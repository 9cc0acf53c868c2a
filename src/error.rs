//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// This enum represents all possible errors that can occur in the application.
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Database Errors**: Any sqlx::Error from database operations
/// - **Authentication Errors**: Invalid sessions or failed logins
/// - **Authorization Errors**: Authenticated but not allowed
/// - **Resource Errors**: Requested resources not found
/// - **Business Logic Errors**: Operations that violate marketplace rules
/// - **Validation Errors**: Invalid request data
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    ///
    /// This wraps any sqlx::Error using the `#[from]` attribute, which
    /// automatically implements `From<sqlx::Error> for AppError`.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Session token is missing, expired, or has a bad signature.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid session")]
    InvalidSession,

    /// Login failed: unknown email or wrong password.
    ///
    /// Returns HTTP 401 Unauthorized. The same variant covers both cases
    /// so that responses don't reveal whether an email is registered.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Authenticated user is not allowed to perform this operation
    /// (non-admin on admin routes, non-member of a room, not a party
    /// to a purchase).
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("Forbidden")]
    Forbidden,

    /// Requested user does not exist.
    #[error("User not found")]
    UserNotFound,

    /// Requested listing does not exist or has been deleted.
    #[error("Listing not found")]
    ListingNotFound,

    /// Requested purchase does not exist.
    #[error("Purchase not found")]
    PurchaseNotFound,

    /// Requested messaging room does not exist.
    #[error("Room not found")]
    RoomNotFound,

    /// Requested payment record does not exist.
    #[error("Payment not found")]
    PaymentNotFound,

    /// Requested report does not exist.
    #[error("Report not found")]
    ReportNotFound,

    /// Requested fee record does not exist.
    #[error("Fee not found")]
    FeeNotFound,

    /// Signup attempted with an email that is already registered.
    ///
    /// Returns HTTP 409 Conflict.
    #[error("Email already registered")]
    EmailTaken,

    /// Signup or profile update attempted with a nickname already in use.
    ///
    /// Returns HTTP 409 Conflict.
    #[error("Nickname already in use")]
    NicknameTaken,

    /// Purchase attempted on a listing that is not active
    /// (already reserved, sold, or deleted).
    ///
    /// Returns HTTP 409 Conflict.
    #[error("Listing is not available")]
    ListingUnavailable,

    /// The caller already rated this purchase.
    ///
    /// Returns HTTP 409 Conflict.
    #[error("Purchase already rated")]
    AlreadyRated,

    /// Purchase status change that the lifecycle does not permit
    /// (e.g., confirming a purchase that was never completed).
    ///
    /// Returns HTTP 422 Unprocessable Entity.
    #[error("Invalid status transition")]
    InvalidStatusTransition,

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),
}

/// Convert AppError into an HTTP response.
///
/// This implementation allows Axum handlers to return `Result<T, AppError>`
/// and have errors automatically converted to proper HTTP responses.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `InvalidSession` / `InvalidCredentials` → 401 Unauthorized
/// - `Forbidden` → 403 Forbidden
/// - `*NotFound` → 404 Not Found
/// - `EmailTaken` / `NicknameTaken` / `ListingUnavailable` / `AlreadyRated` → 409 Conflict
/// - `InvalidStatusTransition` → 422 Unprocessable Entity
/// - `InvalidRequest` → 400 Bad Request
/// - `Database` → 500 Internal Server Error (hides details from client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map each error variant to (HTTP status, error code, message)
        let (status, code, message) = match self {
            AppError::InvalidSession => {
                (StatusCode::UNAUTHORIZED, "invalid_session", self.to_string())
            }
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                self.to_string(),
            ),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", self.to_string()),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "user_not_found", self.to_string()),
            AppError::ListingNotFound => {
                (StatusCode::NOT_FOUND, "listing_not_found", self.to_string())
            }
            AppError::PurchaseNotFound => {
                (StatusCode::NOT_FOUND, "purchase_not_found", self.to_string())
            }
            AppError::RoomNotFound => (StatusCode::NOT_FOUND, "room_not_found", self.to_string()),
            AppError::PaymentNotFound => {
                (StatusCode::NOT_FOUND, "payment_not_found", self.to_string())
            }
            AppError::ReportNotFound => {
                (StatusCode::NOT_FOUND, "report_not_found", self.to_string())
            }
            AppError::FeeNotFound => (StatusCode::NOT_FOUND, "fee_not_found", self.to_string()),
            AppError::EmailTaken => (StatusCode::CONFLICT, "email_taken", self.to_string()),
            AppError::NicknameTaken => (StatusCode::CONFLICT, "nickname_taken", self.to_string()),
            AppError::ListingUnavailable => (
                StatusCode::CONFLICT,
                "listing_unavailable",
                self.to_string(),
            ),
            AppError::AlreadyRated => (StatusCode::CONFLICT, "already_rated", self.to_string()),
            AppError::InvalidStatusTransition => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "invalid_status_transition",
                self.to_string(),
            ),
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            ),
        };

        // Build JSON response body
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        // Return the response with status code and JSON body
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            AppError::InvalidSession.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::ListingNotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::ListingUnavailable.into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::InvalidStatusTransition.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::InvalidRequest("bad".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
