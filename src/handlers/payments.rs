//! Payment HTTP handlers.
//!
//! - POST /api/v1/payments/webhook - Provider server-to-server callback
//! - GET /api/v1/payments/:id - Look up a payment (parties or admin)
//!
//! The webhook endpoint is public: the provider authenticates nothing
//! beyond knowing the URL, and the only state it can produce is what the
//! payment service is willing to record.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    db::AppState,
    error::AppError,
    middleware::auth::AuthContext,
    models::payment::{Payment, WebhookNotification},
    services::payment_service,
};

/// Receive a payment state change from the provider.
///
/// # Request Body
///
/// ```json
/// { "paymentId": "ORD-260829-X7K2QD", "txId": "tx-01H...", "type": "Transaction.Paid" }
/// ```
///
/// Older provider versions send `id` instead of `paymentId`; both are
/// accepted.
///
/// # Response
///
/// Always `200 { "success": true }` for parseable payloads, even when the
/// payment id matches no order — the row is recorded and the provider must
/// stop retrying. Bodies that don't parse get 400.
pub async fn payment_webhook(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let notification: WebhookNotification = serde_json::from_value(payload)
        .map_err(|e| AppError::InvalidRequest(format!("Invalid webhook payload: {e}")))?;

    payment_service::apply_webhook(&state, notification).await?;

    Ok(Json(json!({ "success": true })))
}

/// Get a payment by its provider payment ID.
///
/// # Security
///
/// Visible to the buyer and seller of the linked purchase, and to admins.
/// Payments that arrived for unknown orders have no parties, so only
/// admins can see them.
pub async fn get_payment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(payment_id): Path<String>,
) -> Result<Json<Payment>, AppError> {
    let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
        .bind(&payment_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::PaymentNotFound)?;

    if auth.is_admin {
        return Ok(Json(payment));
    }

    let is_party = match payment.purchase_id {
        Some(purchase_id) => {
            let parties: Option<(Uuid, Uuid)> =
                sqlx::query_as("SELECT buyer_id, seller_id FROM purchases WHERE id = $1")
                    .bind(purchase_id)
                    .fetch_optional(&state.pool)
                    .await?;

            parties.is_some_and(|(buyer_id, seller_id)| {
                buyer_id == auth.user_id || seller_id == auth.user_id
            })
        }
        None => false,
    };

    if !is_party {
        return Err(AppError::Forbidden);
    }

    Ok(Json(payment))
}
