//! SMS notification glue with a per-recipient cooldown.
//!
//! Notifications are strictly best-effort: a failed or skipped send never
//! fails the request that triggered it. Every attempted send is recorded in
//! `notification_logs`, and the same table drives the cooldown window —
//! at most one SMS per (recipient, kind) per 10 minutes.
//!
//! The cooldown is a plain check-then-insert: two racing requests can both
//! pass the check and send twice. That widens the window at worst, and the
//! provider call is the expensive part being protected, so this is fine.

use serde_json::json;
use uuid::Uuid;

use crate::{db::AppState, error::AppError, models::notification::NotificationKind};

/// Cooldown window per (recipient, kind).
const COOLDOWN_MINUTES: i64 = 10;

/// Request timeout for the provider call.
const SEND_TIMEOUT_SECS: u64 = 5;

/// Send an SMS to a user, subject to the cooldown. Never fails the caller.
pub async fn notify(state: &AppState, user_id: Uuid, kind: NotificationKind, text: &str) {
    if let Err(e) = try_notify(state, user_id, kind, text).await {
        tracing::error!(
            "Failed to send {} notification to {}: {:?}",
            kind.as_str(),
            user_id,
            e
        );
    }
}

async fn try_notify(
    state: &AppState,
    user_id: Uuid,
    kind: NotificationKind,
    text: &str,
) -> Result<(), AppError> {
    // Users without a phone never receive SMS
    let phone: Option<String> = sqlx::query_scalar("SELECT phone FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&state.pool)
        .await?
        .flatten();

    let Some(phone) = phone else {
        return Ok(());
    };

    // Cooldown: skip if we already sent this kind recently
    let recently_sent: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM notification_logs
            WHERE user_id = $1
              AND kind = $2
              AND sent_at > NOW() - make_interval(mins => $3)
        )
        "#,
    )
    .bind(user_id)
    .bind(kind.as_str())
    .bind(COOLDOWN_MINUTES as i32)
    .fetch_one(&state.pool)
    .await?;

    if recently_sent {
        tracing::debug!(
            "Skipping {} notification to {}: within cooldown",
            kind.as_str(),
            user_id
        );
        return Ok(());
    }

    send_sms(state, &phone, text).await;

    // Record the attempt; this is what the cooldown check reads
    sqlx::query("INSERT INTO notification_logs (user_id, kind) VALUES ($1, $2)")
        .bind(user_id)
        .bind(kind.as_str())
        .execute(&state.pool)
        .await?;

    Ok(())
}

/// POST the message to the SMS provider. Logs and returns on any failure,
/// including missing provider configuration.
async fn send_sms(state: &AppState, phone: &str, text: &str) {
    let (Some(api_url), Some(api_key)) =
        (&state.config.sms_api_url, &state.config.sms_api_key)
    else {
        tracing::info!("SMS provider not configured; skipping send to {}", phone);
        return;
    };

    let client = match reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(SEND_TIMEOUT_SECS))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("HTTP client error: {}", e);
            return;
        }
    };

    let body = json!({
        "to": phone,
        "from": state.config.sms_sender,
        "text": text,
    });

    match client
        .post(api_url)
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await
    {
        Ok(resp) if resp.status().is_success() => {
            tracing::debug!("SMS sent to {}", phone);
        }
        Ok(resp) => {
            tracing::error!("SMS provider returned {} for {}", resp.status(), phone);
        }
        Err(e) => {
            tracing::error!("SMS request failed for {}: {}", phone, e);
        }
    }
}
