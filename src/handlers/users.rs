//! User profile HTTP handlers.
//!
//! - GET /api/v1/users/me - Authenticated user's own profile
//! - PATCH /api/v1/users/me - Update nickname and/or phone
//! - GET /api/v1/users/:id - Public profile with rating summary

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    db::AppState,
    error::AppError,
    middleware::auth::AuthContext,
    models::user::{PublicProfileResponse, UpdateProfileRequest, User, UserResponse},
};

/// Get the authenticated user's own profile, including email and phone.
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<UserResponse>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(auth.user_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::UserNotFound)?;

    Ok(Json(user.into()))
}

/// Update the authenticated user's nickname and/or phone.
///
/// # Request Body
///
/// ```json
/// { "nickname": "newname", "phone": "01098765432" }
/// ```
///
/// Only provided fields are changed. Nickname uniqueness is re-checked
/// (409 on conflict).
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    if let Some(ref nickname) = request.nickname {
        let nickname = nickname.trim();
        validate_nickname(nickname)?;

        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE nickname = $1 AND id <> $2)",
        )
        .bind(nickname)
        .bind(auth.user_id)
        .fetch_one(&state.pool)
        .await?;
        if taken {
            return Err(AppError::NicknameTaken);
        }
    }

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET nickname = COALESCE($1, nickname),
            phone = COALESCE($2, phone),
            updated_at = NOW()
        WHERE id = $3
        RETURNING *
        "#,
    )
    .bind(request.nickname.as_deref().map(str::trim))
    .bind(&request.phone)
    .bind(auth.user_id)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| match e {
        // Constraint backstop for renames that race past the pre-check
        sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::NicknameTaken,
        other => AppError::Database(other),
    })?;

    Ok(Json(user.into()))
}

/// Nickname length rule shared by signup and profile update.
///
/// Counts characters, not bytes: Korean nicknames are the common case.
pub fn validate_nickname(nickname: &str) -> Result<(), AppError> {
    let len = nickname.chars().count();
    if !(2..=30).contains(&len) {
        return Err(AppError::InvalidRequest(
            "Nickname must be 2 to 30 characters".to_string(),
        ));
    }
    Ok(())
}

/// Get another user's public profile.
///
/// # Response (200)
///
/// ```json
/// {
///   "id": "550e8400-...",
///   "nickname": "ticketfan",
///   "rating_average": 4.5,
///   "rating_count": 12,
///   "created_at": "2025-06-01T10:00:00Z"
/// }
/// ```
///
/// Never exposes email, phone, or credential columns.
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<PublicProfileResponse>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::UserNotFound)?;

    let (rating_average, rating_count): (Option<f64>, i64) = sqlx::query_as(
        "SELECT AVG(score)::float8, COUNT(*) FROM ratings WHERE ratee_id = $1",
    )
    .bind(user_id)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(PublicProfileResponse {
        id: user.id,
        nickname: user.nickname,
        rating_average,
        rating_count,
        created_at: user.created_at,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nickname_limit_counts_characters_not_bytes() {
        // 11 Korean characters is 33 bytes but within 2..=30
        assert!(validate_nickname(&"왕".repeat(11)).is_ok());
        assert!(validate_nickname(&"왕".repeat(31)).is_err());
    }

    #[test]
    fn nickname_rejects_out_of_range() {
        assert!(validate_nickname("a").is_err());
        assert!(validate_nickname("ab").is_ok());
        assert!(validate_nickname(&"x".repeat(30)).is_ok());
        assert!(validate_nickname(&"x".repeat(31)).is_err());
    }
}
