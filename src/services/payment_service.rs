//! Payment service - applies provider webhook callbacks.
//!
//! The provider's event types are mapped onto our four-value status enum
//! and upserted into the `payments` table, keyed by the provider payment
//! id. A `DONE` payment whose id matches a purchase order number completes
//! that purchase through the same path as the seller's complete action.

use crate::{
    db::AppState,
    error::AppError,
    models::payment::{PaymentStatus, WebhookNotification},
    services::purchase_service::{self, CompleteActor},
};
use uuid::Uuid;

/// Map a provider event type to an internal payment status.
///
/// Returns `None` for types we don't recognize; the caller records those as
/// `PENDING` after logging.
pub fn map_event_type(event_type: &str) -> Option<PaymentStatus> {
    match event_type {
        "Transaction.Paid" => Some(PaymentStatus::Done),
        "Transaction.Failed" => Some(PaymentStatus::Failed),
        "Transaction.Cancelled" | "Transaction.PartialCancelled" => {
            Some(PaymentStatus::Cancelled)
        }
        "Transaction.Ready" | "Transaction.VirtualAccountIssued" => Some(PaymentStatus::Pending),
        _ => None,
    }
}

/// Apply one webhook callback.
///
/// # Process
///
/// 1. Map the event type (unknown types become PENDING, logged at warn)
/// 2. Look up the purchase whose order number is the payment id
/// 3. Upsert the payment row
/// 4. On DONE with a matching purchase, complete it (idempotent)
///
/// Completion failures are logged but don't fail the webhook — the payment
/// row is already recorded and the provider should not keep retrying.
pub async fn apply_webhook(
    state: &AppState,
    notification: WebhookNotification,
) -> Result<(), AppError> {
    let status = match map_event_type(&notification.event_type) {
        Some(status) => status,
        None => {
            tracing::warn!(
                "Unrecognized payment event type '{}' for payment {}",
                notification.event_type,
                notification.payment_id
            );
            PaymentStatus::Pending
        }
    };

    // Webhooks can arrive for ids we never issued; record them unlinked
    let purchase_id: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM purchases WHERE order_number = $1")
            .bind(&notification.payment_id)
            .fetch_optional(&state.pool)
            .await?;

    sqlx::query(
        r#"
        INSERT INTO payments (id, purchase_id, tx_id, status, raw_type)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (id) DO UPDATE
        SET tx_id = EXCLUDED.tx_id,
            status = EXCLUDED.status,
            raw_type = EXCLUDED.raw_type,
            updated_at = NOW()
        "#,
    )
    .bind(&notification.payment_id)
    .bind(purchase_id)
    .bind(&notification.tx_id)
    .bind(status.as_str())
    .bind(&notification.event_type)
    .execute(&state.pool)
    .await?;

    tracing::info!(
        "Payment {} recorded as {} (tx: {:?})",
        notification.payment_id,
        status.as_str(),
        notification.tx_id
    );

    if status == PaymentStatus::Done {
        if let Some(purchase_id) = purchase_id {
            if let Err(e) =
                purchase_service::complete_purchase(state, purchase_id, CompleteActor::PaymentProvider)
                    .await
            {
                tracing::error!(
                    "Payment {} is DONE but purchase {} could not be completed: {:?}",
                    notification.payment_id,
                    purchase_id,
                    e
                );
            }
        } else {
            tracing::warn!(
                "DONE payment {} does not match any order",
                notification.payment_id
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_terminal_types() {
        assert_eq!(map_event_type("Transaction.Paid"), Some(PaymentStatus::Done));
        assert_eq!(
            map_event_type("Transaction.Failed"),
            Some(PaymentStatus::Failed)
        );
        assert_eq!(
            map_event_type("Transaction.Cancelled"),
            Some(PaymentStatus::Cancelled)
        );
        assert_eq!(
            map_event_type("Transaction.PartialCancelled"),
            Some(PaymentStatus::Cancelled)
        );
    }

    #[test]
    fn maps_in_progress_types_to_pending() {
        assert_eq!(
            map_event_type("Transaction.Ready"),
            Some(PaymentStatus::Pending)
        );
        assert_eq!(
            map_event_type("Transaction.VirtualAccountIssued"),
            Some(PaymentStatus::Pending)
        );
    }

    #[test]
    fn unknown_types_are_not_mapped() {
        assert_eq!(map_event_type("Transaction.Whatever"), None);
        assert_eq!(map_event_type(""), None);
    }
}
