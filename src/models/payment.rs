//! Payment models for the provider webhook integration.
//!
//! The payment provider calls our webhook endpoint server-to-server whenever
//! a payment changes state. We never initiate payments ourselves; the
//! `payments` table is a local mirror of what the provider has told us.
//!
//! # Webhook Flow
//!
//! 1. Buyer pays through the provider's checkout, using the purchase's
//!    order number as the payment id
//! 2. Provider POSTs `{ "paymentId", "txId", "type" }` to our webhook
//! 3. We map the provider event type to an internal status and upsert
//!    the payment row
//! 4. A `DONE` payment completes the matching purchase

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Internal payment status, mapped from provider event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PaymentStatus {
    Pending,
    Done,
    Failed,
    Cancelled,
}

impl PaymentStatus {
    /// The string stored in the `status` column and returned to clients.
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Done => "DONE",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Cancelled => "CANCELLED",
        }
    }
}

/// Represents a payment record from the database.
///
/// # Database Table
///
/// Maps to the `payments` table. The primary key is the provider's payment
/// id (text), which for payments we initiated equals a purchase order
/// number. `purchase_id` is NULL for webhooks that arrive for ids we don't
/// recognize — we record them anyway.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Payment {
    pub id: String,
    pub purchase_id: Option<Uuid>,

    /// Provider-side transaction id from the last webhook
    pub tx_id: Option<String>,

    /// One of PENDING / DONE / FAILED / CANCELLED
    pub status: String,

    /// Raw provider event type from the last webhook, kept for debugging
    pub raw_type: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload the payment provider POSTs to our webhook.
///
/// # JSON Examples
///
/// Newer provider versions send `paymentId`:
///
/// ```json
/// { "paymentId": "ORD-260827-X7K2QD", "txId": "tx-01H...", "type": "Transaction.Paid" }
/// ```
///
/// Older versions send `id` instead; both are accepted.
#[derive(Debug, Deserialize)]
pub struct WebhookNotification {
    #[serde(rename = "paymentId", alias = "id")]
    pub payment_id: String,

    #[serde(rename = "txId")]
    pub tx_id: Option<String>,

    /// Provider event type, e.g. "Transaction.Paid"
    #[serde(rename = "type")]
    pub event_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webhook_accepts_payment_id_field() {
        let n: WebhookNotification = serde_json::from_str(
            r#"{"paymentId":"ORD-260827-ABC123","txId":"tx-1","type":"Transaction.Paid"}"#,
        )
        .unwrap();
        assert_eq!(n.payment_id, "ORD-260827-ABC123");
        assert_eq!(n.tx_id.as_deref(), Some("tx-1"));
        assert_eq!(n.event_type, "Transaction.Paid");
    }

    #[test]
    fn webhook_accepts_legacy_id_field() {
        let n: WebhookNotification =
            serde_json::from_str(r#"{"id":"ORD-260827-ABC123","type":"Transaction.Failed"}"#)
                .unwrap();
        assert_eq!(n.payment_id, "ORD-260827-ABC123");
        assert!(n.tx_id.is_none());
    }

    #[test]
    fn webhook_rejects_missing_payment_id() {
        let result =
            serde_json::from_str::<WebhookNotification>(r#"{"type":"Transaction.Paid"}"#);
        assert!(result.is_err());
    }
}
