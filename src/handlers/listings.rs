//! Listing HTTP handlers.
//!
//! This module implements the listing-related API endpoints:
//! - POST /api/v1/listings - Create a listing (auth)
//! - GET /api/v1/listings - Search/list listings (public)
//! - GET /api/v1/listings/:id - Get one listing (public)
//! - PATCH /api/v1/listings/:id - Update own active listing (auth)
//! - DELETE /api/v1/listings/:id - Soft-delete own active listing (auth)

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    db::AppState,
    error::AppError,
    middleware::auth::AuthContext,
    models::listing::{
        CreateListingRequest, Listing, ListingQuery, ListingResponse, UpdateListingRequest, status,
    },
};

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

/// Create a new listing.
///
/// # Request Body
///
/// ```json
/// {
///   "kind": "sell",
///   "title": "2 tickets, floor seats",
///   "event_name": "Example Tour 2026",
///   "price_cents": 120000,
///   "quantity": 2
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: the created listing, status `active`
/// - **Error (400)**: validation failure
/// - **Error (401)**: not logged in
pub async fn create_listing(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateListingRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_listing_fields(
        Some(&request.kind),
        Some(&request.title),
        Some(&request.event_name),
        Some(request.price_cents),
        Some(request.quantity),
    )?;

    let listing = sqlx::query_as::<_, Listing>(
        r#"
        INSERT INTO listings (seller_id, kind, title, description, event_name, event_date, venue, price_cents, quantity)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(auth.user_id)
    .bind(&request.kind)
    .bind(request.title.trim())
    .bind(&request.description)
    .bind(request.event_name.trim())
    .bind(request.event_date)
    .bind(&request.venue)
    .bind(request.price_cents)
    .bind(request.quantity)
    .fetch_one(&state.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(ListingResponse::from(listing))))
}

/// Search and list listings.
///
/// # Query Parameters
///
/// - `q`: case-insensitive substring match on title and event name
/// - `kind`: "sell" or "buy"
/// - `status`: defaults to "active"; "deleted" is never served
/// - `limit` (default 20, max 100) / `offset`
///
/// Newest first.
pub async fn list_listings(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<Vec<ListingResponse>>, AppError> {
    let status_filter = query.status.as_deref().unwrap_or(status::ACTIVE);
    if status_filter == status::DELETED {
        return Err(AppError::InvalidRequest(
            "Deleted listings are not listable".to_string(),
        ));
    }

    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);

    // NULL parameters disable their filter
    let listings = sqlx::query_as::<_, Listing>(
        r#"
        SELECT * FROM listings
        WHERE status = $1
          AND ($2::text IS NULL OR kind = $2)
          AND ($3::text IS NULL OR title ILIKE '%' || $3 || '%' OR event_name ILIKE '%' || $3 || '%')
        ORDER BY created_at DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(status_filter)
    .bind(&query.kind)
    .bind(&query.q)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(listings.into_iter().map(Into::into).collect()))
}

/// Get a single listing by ID. Soft-deleted listings return 404.
pub async fn get_listing(
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
) -> Result<Json<ListingResponse>, AppError> {
    let listing = sqlx::query_as::<_, Listing>(
        "SELECT * FROM listings WHERE id = $1 AND status <> 'deleted'",
    )
    .bind(listing_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::ListingNotFound)?;

    Ok(Json(listing.into()))
}

/// Update a listing. Seller only, and only while the listing is `active`
/// (a reserved or sold listing's terms are locked in).
pub async fn update_listing(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(listing_id): Path<Uuid>,
    Json(request): Json<UpdateListingRequest>,
) -> Result<Json<ListingResponse>, AppError> {
    validate_listing_fields(
        None,
        request.title.as_deref(),
        request.event_name.as_deref(),
        request.price_cents,
        request.quantity,
    )?;

    let listing = sqlx::query_as::<_, Listing>(
        "SELECT * FROM listings WHERE id = $1 AND status <> 'deleted'",
    )
    .bind(listing_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::ListingNotFound)?;

    if listing.seller_id != auth.user_id {
        return Err(AppError::Forbidden);
    }
    if listing.status != status::ACTIVE {
        return Err(AppError::ListingUnavailable);
    }

    let listing = sqlx::query_as::<_, Listing>(
        r#"
        UPDATE listings
        SET title = COALESCE($1, title),
            description = COALESCE($2, description),
            event_name = COALESCE($3, event_name),
            event_date = COALESCE($4, event_date),
            venue = COALESCE($5, venue),
            price_cents = COALESCE($6, price_cents),
            quantity = COALESCE($7, quantity),
            updated_at = NOW()
        WHERE id = $8
        RETURNING *
        "#,
    )
    .bind(request.title.as_deref().map(str::trim))
    .bind(&request.description)
    .bind(request.event_name.as_deref().map(str::trim))
    .bind(request.event_date)
    .bind(&request.venue)
    .bind(request.price_cents)
    .bind(request.quantity)
    .bind(listing_id)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(listing.into()))
}

/// Soft-delete a listing. Seller only, `active` listings only — a listing
/// with a pending purchase must be cancelled through the purchase instead.
pub async fn delete_listing(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(listing_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query(
        "UPDATE listings SET status = 'deleted', updated_at = NOW()
         WHERE id = $1 AND seller_id = $2 AND status = 'active'",
    )
    .bind(listing_id)
    .bind(auth.user_id)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        // Distinguish "not yours / not active" from "doesn't exist"
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM listings WHERE id = $1 AND status <> 'deleted')",
        )
        .bind(listing_id)
        .fetch_one(&state.pool)
        .await?;

        return Err(if exists {
            AppError::Forbidden
        } else {
            AppError::ListingNotFound
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Shared field validation for create and update. `None` fields are skipped.
fn validate_listing_fields(
    kind: Option<&str>,
    title: Option<&str>,
    event_name: Option<&str>,
    price_cents: Option<i64>,
    quantity: Option<i32>,
) -> Result<(), AppError> {
    if let Some(kind) = kind {
        if kind != "sell" && kind != "buy" {
            return Err(AppError::InvalidRequest(
                "kind must be \"sell\" or \"buy\"".to_string(),
            ));
        }
    }
    // Character counts, not byte lengths: most titles here are Korean
    if let Some(title) = title {
        let len = title.trim().chars().count();
        if len == 0 || len > 200 {
            return Err(AppError::InvalidRequest(
                "title must be 1 to 200 characters".to_string(),
            ));
        }
    }
    if let Some(event_name) = event_name {
        let len = event_name.trim().chars().count();
        if len == 0 || len > 200 {
            return Err(AppError::InvalidRequest(
                "event_name must be 1 to 200 characters".to_string(),
            ));
        }
    }
    if let Some(price) = price_cents {
        if price <= 0 {
            return Err(AppError::InvalidRequest(
                "price_cents must be positive".to_string(),
            ));
        }
    }
    if let Some(quantity) = quantity {
        if quantity <= 0 {
            return Err(AppError::InvalidRequest(
                "quantity must be positive".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_kind() {
        assert!(validate_listing_fields(Some("swap"), None, None, None, None).is_err());
        assert!(validate_listing_fields(Some("sell"), None, None, None, None).is_ok());
        assert!(validate_listing_fields(Some("buy"), None, None, None, None).is_ok());
    }

    #[test]
    fn rejects_non_positive_amounts() {
        assert!(validate_listing_fields(None, None, None, Some(0), None).is_err());
        assert!(validate_listing_fields(None, None, None, Some(-5), None).is_err());
        assert!(validate_listing_fields(None, None, None, None, Some(0)).is_err());
        assert!(validate_listing_fields(None, None, None, Some(100), Some(1)).is_ok());
    }

    #[test]
    fn rejects_blank_title() {
        assert!(validate_listing_fields(None, Some("   "), None, None, None).is_err());
        assert!(validate_listing_fields(None, Some("ok"), None, None, None).is_ok());
    }

    #[test]
    fn title_limit_counts_characters_not_bytes() {
        // 120 Korean characters is 360 bytes but well within the limit
        let title = "표".repeat(120);
        assert!(validate_listing_fields(None, Some(&title), None, None, None).is_ok());

        let too_long = "표".repeat(201);
        assert!(validate_listing_fields(None, Some(&too_long), None, None, None).is_err());

        let event = "콘서트".repeat(50);
        assert!(validate_listing_fields(None, None, Some(&event), None, None).is_ok());
    }
}
