//! Purchase HTTP handlers.
//!
//! This module implements the order API endpoints:
//! - POST /api/v1/purchases - Start a purchase on a listing
//! - GET /api/v1/purchases - List own purchases (as buyer or seller)
//! - GET /api/v1/purchases/:id - Get one purchase (parties only)
//! - POST /api/v1/purchases/:id/complete - Seller marks the order completed
//! - POST /api/v1/purchases/:id/confirm - Buyer confirms receipt
//! - POST /api/v1/purchases/:id/cancel - Either party cancels a pending order
//!
//! All transitions run in the purchase service under a row lock; handlers
//! stay thin.

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
    models::purchase::{CreatePurchaseRequest, Purchase, PurchaseResponse},
    services::purchase_service::{self, CompleteActor},
};

/// Start a purchase on a listing.
///
/// # Request Body
///
/// ```json
/// { "listing_id": "550e8400-e29b-41d4-a716-446655440000" }
/// ```
///
/// # Response (201)
///
/// ```json
/// {
///   "id": "770e8400-...",
///   "order_number": "ORD-260829-X7K2QD",
///   "listing_id": "550e8400-...",
///   "price_cents": 120000,
///   "status": "PENDING",
///   "created_at": "2026-08-29T16:00:00Z"
/// }
/// ```
///
/// # Side Effects
///
/// The listing is reserved, a chat room is opened for buyer and seller,
/// and the seller receives a best-effort SMS notification.
///
/// # Errors
///
/// - **404**: listing doesn't exist or was deleted
/// - **400**: buyer is the seller
/// - **409**: listing is already reserved or sold
pub async fn create_purchase(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreatePurchaseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let purchase =
        purchase_service::create_purchase(&state, auth.user_id, request.listing_id).await?;

    Ok((StatusCode::CREATED, Json(PurchaseResponse::from(purchase))))
}

/// List the caller's purchases, as buyer or seller, newest first.
pub async fn list_purchases(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<PurchaseResponse>>, AppError> {
    let purchases = sqlx::query_as::<_, Purchase>(
        r#"
        SELECT * FROM purchases
        WHERE buyer_id = $1 OR seller_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(auth.user_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(purchases.into_iter().map(Into::into).collect()))
}

/// Get a purchase by ID.
///
/// # Security
///
/// Only the buyer and the seller may see a purchase. A caller who is
/// neither gets 403; an unknown id gets 404.
pub async fn get_purchase(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(purchase_id): Path<Uuid>,
) -> Result<Json<PurchaseResponse>, AppError> {
    let purchase = sqlx::query_as::<_, Purchase>("SELECT * FROM purchases WHERE id = $1")
        .bind(purchase_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::PurchaseNotFound)?;

    if purchase.buyer_id != auth.user_id && purchase.seller_id != auth.user_id {
        return Err(AppError::Forbidden);
    }

    Ok(Json(purchase.into()))
}

/// Seller marks a pending purchase completed: `PENDING` → `COMPLETED`.
///
/// Marks the listing sold, records the platform fee, and notifies
/// the buyer.
///
/// # Errors
///
/// - **403**: caller is not the seller
/// - **422**: purchase is not `PENDING`
pub async fn complete_purchase(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(purchase_id): Path<Uuid>,
) -> Result<Json<PurchaseResponse>, AppError> {
    let purchase =
        purchase_service::complete_purchase(&state, purchase_id, CompleteActor::Seller(auth.user_id))
            .await?;

    Ok(Json(purchase.into()))
}

/// Buyer confirms a completed purchase: `COMPLETED` → `CONFIRMED`.
///
/// # Errors
///
/// - **403**: caller is not the buyer
/// - **422**: purchase is not `COMPLETED`
pub async fn confirm_purchase(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(purchase_id): Path<Uuid>,
) -> Result<Json<PurchaseResponse>, AppError> {
    let purchase = purchase_service::confirm_purchase(&state, purchase_id, auth.user_id).await?;

    Ok(Json(purchase.into()))
}

/// Either party cancels a pending purchase: `PENDING` → `CANCELLED`.
///
/// The listing goes back to `active`.
///
/// # Errors
///
/// - **403**: caller is neither party
/// - **422**: purchase is not `PENDING`
pub async fn cancel_purchase(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(purchase_id): Path<Uuid>,
) -> Result<Json<PurchaseResponse>, AppError> {
    let purchase = purchase_service::cancel_purchase(&state, purchase_id, auth.user_id).await?;

    Ok(Json(purchase.into()))
}
