//! User report HTTP handlers.
//!
//! - POST /api/v1/reports - File a report against a user
//!
//! Admin-side report endpoints (listing and resolving) live in the
//! admin handler module.

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    db::AppState,
    error::AppError,
    middleware::auth::AuthContext,
    models::report::{CreateReportRequest, Report},
};

const MAX_REASON_LEN: usize = 1000;

/// File a report against another user, optionally pointing at one of
/// their listings.
///
/// # Request Body
///
/// ```json
/// {
///   "reported_user_id": "660e8400-...",
///   "listing_id": "550e8400-...",
///   "reason": "Asked to pay outside the platform"
/// }
/// ```
///
/// # Errors
///
/// - **400**: blank/oversized reason or self-report
/// - **404**: reported user doesn't exist
pub async fn create_report(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateReportRequest>,
) -> Result<impl IntoResponse, AppError> {
    let reason = request.reason.trim();
    let reason_len = reason.chars().count();
    if reason_len == 0 || reason_len > MAX_REASON_LEN {
        return Err(AppError::InvalidRequest(
            "Reason must be 1 to 1000 characters".to_string(),
        ));
    }
    if request.reported_user_id == auth.user_id {
        return Err(AppError::InvalidRequest(
            "Cannot report yourself".to_string(),
        ));
    }

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(request.reported_user_id)
        .fetch_one(&state.pool)
        .await?;
    if !exists {
        return Err(AppError::UserNotFound);
    }

    let report = sqlx::query_as::<_, Report>(
        r#"
        INSERT INTO reports (reporter_id, reported_user_id, listing_id, reason)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(auth.user_id)
    .bind(request.reported_user_id)
    .bind(request.listing_id)
    .bind(reason)
    .fetch_one(&state.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(report)))
}
