//! Notification log HTTP handlers.
//!
//! - GET /api/v1/notifications - The caller's recent notification log rows

use axum::{Extension, Json, extract::State};

use crate::{
    db::AppState, error::AppError, middleware::auth::AuthContext,
    models::notification::NotificationLog,
};

/// How many log rows the endpoint serves.
const RECENT_LIMIT: i64 = 50;

/// List the caller's recent notifications, newest first.
///
/// These are delivery log rows, not an inbox: each row records one SMS
/// send attempt.
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<NotificationLog>>, AppError> {
    let logs = sqlx::query_as::<_, NotificationLog>(
        r#"
        SELECT * FROM notification_logs
        WHERE user_id = $1
        ORDER BY sent_at DESC
        LIMIT $2
        "#,
    )
    .bind(auth.user_id)
    .bind(RECENT_LIMIT)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(logs))
}
