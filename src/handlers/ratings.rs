//! Rating HTTP handlers.
//!
//! - POST /api/v1/ratings - Rate the counterpart of a confirmed purchase
//! - GET /api/v1/users/:id/ratings - A user's received ratings and average

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    db::AppState,
    error::AppError,
    middleware::auth::AuthContext,
    models::purchase::{Purchase, status},
    models::rating::{CreateRatingRequest, Rating, UserRatingsResponse},
};

const MAX_COMMENT_LEN: usize = 1000;

/// Rate the other party of a confirmed purchase.
///
/// # Request Body
///
/// ```json
/// { "purchase_id": "770e8400-...", "score": 5, "comment": "smooth deal" }
/// ```
///
/// The ratee is not part of the request: it is always the other party of
/// the purchase.
///
/// # Errors
///
/// - **400**: score outside 1..=5, comment too long, or purchase not
///   yet confirmed
/// - **403**: caller is not a party to the purchase
/// - **404**: purchase doesn't exist
/// - **409**: caller already rated this purchase
pub async fn create_rating(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateRatingRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !(1..=5).contains(&request.score) {
        return Err(AppError::InvalidRequest(
            "score must be between 1 and 5".to_string(),
        ));
    }
    if let Some(ref comment) = request.comment {
        if comment.chars().count() > MAX_COMMENT_LEN {
            return Err(AppError::InvalidRequest(
                "comment must be at most 1000 characters".to_string(),
            ));
        }
    }

    let purchase = sqlx::query_as::<_, Purchase>("SELECT * FROM purchases WHERE id = $1")
        .bind(request.purchase_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::PurchaseNotFound)?;

    if purchase.buyer_id != auth.user_id && purchase.seller_id != auth.user_id {
        return Err(AppError::Forbidden);
    }
    if purchase.status != status::CONFIRMED {
        return Err(AppError::InvalidRequest(
            "Purchase must be confirmed before rating".to_string(),
        ));
    }

    let already_rated: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM ratings WHERE purchase_id = $1 AND rater_id = $2)",
    )
    .bind(purchase.id)
    .bind(auth.user_id)
    .fetch_one(&state.pool)
    .await?;
    if already_rated {
        return Err(AppError::AlreadyRated);
    }

    let ratee_id = if auth.user_id == purchase.buyer_id {
        purchase.seller_id
    } else {
        purchase.buyer_id
    };

    // The (purchase_id, rater_id) constraint backstops the pre-check
    let rating = sqlx::query_as::<_, Rating>(
        r#"
        INSERT INTO ratings (purchase_id, rater_id, ratee_id, score, comment)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(purchase.id)
    .bind(auth.user_id)
    .bind(ratee_id)
    .bind(request.score)
    .bind(&request.comment)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::AlreadyRated,
        other => AppError::Database(other),
    })?;

    Ok((StatusCode::CREATED, Json(rating)))
}

/// List a user's received ratings with their average.
///
/// # Response (200)
///
/// ```json
/// {
///   "average": 4.5,
///   "count": 12,
///   "ratings": [ { "score": 5, "comment": "smooth deal", ... } ]
/// }
/// ```
pub async fn list_user_ratings(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserRatingsResponse>, AppError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(user_id)
        .fetch_one(&state.pool)
        .await?;
    if !exists {
        return Err(AppError::UserNotFound);
    }

    let ratings = sqlx::query_as::<_, Rating>(
        "SELECT * FROM ratings WHERE ratee_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(&state.pool)
    .await?;

    let count = ratings.len() as i64;
    let average = if ratings.is_empty() {
        None
    } else {
        Some(ratings.iter().map(|r| r.score as f64).sum::<f64>() / count as f64)
    };

    Ok(Json(UserRatingsResponse {
        average,
        count,
        ratings,
    }))
}
