//! Admin HTTP handlers.
//!
//! Everything here is mounted under /api/v1/admin and runs behind both
//! the session middleware and the admin gate:
//! - GET /api/v1/admin/users - Paginated user list
//! - POST /api/v1/admin/users/:id/suspend, /unsuspend
//! - GET /api/v1/admin/reports?status= - Review queue
//! - POST /api/v1/admin/reports/:id/resolve
//! - GET /api/v1/admin/fees?unpaid=true - Commission ledger
//! - POST /api/v1/admin/fees/:id/paid

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::AppState,
    error::AppError,
    models::fee::{Fee, FeeQuery},
    models::report::{Report, ReportQuery, status as report_status},
    models::user::{AdminUserResponse, User},
};

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

/// Pagination for the admin user list.
#[derive(Debug, Deserialize)]
pub struct UserPageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// List users, newest first, with contact columns and suspension state
/// visible.
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserPageQuery>,
) -> Result<Json<Vec<AdminUserResponse>>, AppError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);

    let users = sqlx::query_as::<_, User>(
        "SELECT * FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// Suspend a user. Suspended users keep their data but cannot log in and
/// existing session tokens stop working at the middleware.
pub async fn suspend_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<AdminUserResponse>, AppError> {
    set_suspended(&state, user_id, true).await
}

/// Lift a user's suspension.
pub async fn unsuspend_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<AdminUserResponse>, AppError> {
    set_suspended(&state, user_id, false).await
}

async fn set_suspended(
    state: &AppState,
    user_id: Uuid,
    suspended: bool,
) -> Result<Json<AdminUserResponse>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET is_suspended = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
    )
    .bind(suspended)
    .bind(user_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::UserNotFound)?;

    tracing::info!(
        "User {} {}",
        user_id,
        if suspended { "suspended" } else { "unsuspended" }
    );

    Ok(Json(user.into()))
}

/// List reports for review, optionally filtered by status, newest first.
///
/// `GET /api/v1/admin/reports?status=open`
pub async fn list_reports(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<Report>>, AppError> {
    if let Some(ref status) = query.status {
        if status != report_status::OPEN && status != report_status::RESOLVED {
            return Err(AppError::InvalidRequest(
                "status must be \"open\" or \"resolved\"".to_string(),
            ));
        }
    }

    let reports = sqlx::query_as::<_, Report>(
        r#"
        SELECT * FROM reports
        WHERE ($1::text IS NULL OR status = $1)
        ORDER BY created_at DESC
        "#,
    )
    .bind(&query.status)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(reports))
}

/// Mark a report resolved. Resolving an already-resolved report keeps its
/// original `resolved_at`.
pub async fn resolve_report(
    State(state): State<AppState>,
    Path(report_id): Path<Uuid>,
) -> Result<Json<Report>, AppError> {
    let report = sqlx::query_as::<_, Report>(
        r#"
        UPDATE reports
        SET status = 'resolved', resolved_at = COALESCE(resolved_at, NOW())
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(report_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::ReportNotFound)?;

    Ok(Json(report))
}

/// List platform fees, newest first.
///
/// `GET /api/v1/admin/fees?unpaid=true` narrows to fees still owed.
pub async fn list_fees(
    State(state): State<AppState>,
    Query(query): Query<FeeQuery>,
) -> Result<Json<Vec<Fee>>, AppError> {
    let unpaid_only = query.unpaid.unwrap_or(false);

    let fees = sqlx::query_as::<_, Fee>(
        r#"
        SELECT * FROM fees
        WHERE NOT $1 OR NOT is_paid
        ORDER BY created_at DESC
        "#,
    )
    .bind(unpaid_only)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(fees))
}

/// Mark a fee as settled by the seller. Idempotent: paying an
/// already-paid fee keeps its original `paid_at`.
pub async fn mark_fee_paid(
    State(state): State<AppState>,
    Path(fee_id): Path<Uuid>,
) -> Result<Json<Fee>, AppError> {
    let fee = sqlx::query_as::<_, Fee>(
        r#"
        UPDATE fees
        SET is_paid = TRUE, paid_at = COALESCE(paid_at, NOW())
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(fee_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::FeeNotFound)?;

    Ok(Json(fee))
}
