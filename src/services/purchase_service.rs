//! Purchase service - order creation and lifecycle transitions.
//!
//! This service handles:
//! - Order-number generation
//! - Purchase creation (reserving the listing, opening the chat room)
//! - Status transitions (complete / confirm / cancel)
//! - Platform fee recording
//!
//! # Atomicity Guarantees
//!
//! Every operation that touches a purchase and its listing runs inside a
//! PostgreSQL transaction with the relevant rows locked `FOR UPDATE`, so
//! concurrent buyers or double-submitted transition requests serialize on
//! the row. Order numbers are ultimately guaranteed unique by the
//! `purchases.order_number` constraint; the generation loop is only a
//! best-effort retry in front of it.

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::{
    db::AppState,
    error::AppError,
    models::notification::NotificationKind,
    models::{listing, purchase::Purchase, purchase::status},
    services::notification_service,
};

/// Who is driving a purchase completion.
#[derive(Debug, Clone, Copy)]
pub enum CompleteActor {
    /// The seller pressed "complete" in the app; must match `seller_id`.
    Seller(Uuid),
    /// A DONE payment webhook. Idempotent: completing an already-completed
    /// or already-confirmed purchase is a no-op.
    PaymentProvider,
}

const ORDER_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ORDER_CODE_LEN: usize = 6;
const ORDER_NUMBER_ATTEMPTS: usize = 5;

/// Unique constraint backing the order-number generator.
const ORDER_NUMBER_CONSTRAINT: &str = "purchases_order_number_key";

/// Generate one candidate order number, e.g. `ORD-260827-X7K2QD`.
fn generate_order_number() -> String {
    let mut rng = rand::rng();
    let code: String = (0..ORDER_CODE_LEN)
        .map(|_| ORDER_CODE_CHARSET[rng.random_range(0..ORDER_CODE_CHARSET.len())] as char)
        .collect();

    format!("ORD-{}-{}", Utc::now().format("%y%m%d"), code)
}

/// Pick an order number that is not currently taken.
///
/// Generate-then-check loop with a bounded number of attempts. A collision
/// between the check and the insert is still possible; the unique constraint
/// on `order_number` is what actually prevents duplicates.
async fn fresh_order_number(state: &AppState) -> Result<String, AppError> {
    for _ in 0..ORDER_NUMBER_ATTEMPTS {
        let candidate = generate_order_number();

        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM purchases WHERE order_number = $1)")
                .bind(&candidate)
                .fetch_one(&state.pool)
                .await?;

        if !taken {
            return Ok(candidate);
        }
    }

    // 36^6 codes per day; exhausting 5 attempts means something is very wrong
    Err(AppError::InvalidRequest(
        "Could not allocate an order number".to_string(),
    ))
}

/// Start a purchase for a listing.
///
/// # Process
///
/// 1. Allocate an order number
/// 2. Run the purchase transaction (below); if the insert loses a race on
///    the `order_number` constraint, go around with a fresh code
/// 3. Notify the seller (best-effort)
///
/// # Errors
///
/// - `ListingNotFound`: listing doesn't exist or was deleted
/// - `InvalidRequest`: buyer is the seller
/// - `ListingUnavailable`: listing is reserved or sold
pub async fn create_purchase(
    state: &AppState,
    buyer_id: Uuid,
    listing_id: Uuid,
) -> Result<Purchase, AppError> {
    for _ in 0..ORDER_NUMBER_ATTEMPTS {
        let order_number = fresh_order_number(state).await?;

        let purchase = match insert_purchase(state, buyer_id, listing_id, &order_number).await {
            // Another buyer took this code between our check and the insert
            Err(e) if is_order_number_collision(&e) => continue,
            result => result?,
        };

        notification_service::notify(
            state,
            purchase.seller_id,
            NotificationKind::PurchaseCreated,
            &format!("New order {} on your listing", purchase.order_number),
        )
        .await;

        return Ok(purchase);
    }

    Err(AppError::InvalidRequest(
        "Could not allocate an order number".to_string(),
    ))
}

/// A unique violation on `purchases.order_number`. Violations of any other
/// constraint propagate to the caller.
fn is_order_number_collision(err: &AppError) -> bool {
    matches!(
        err,
        AppError::Database(sqlx::Error::Database(db))
            if db.is_unique_violation() && db.constraint() == Some(ORDER_NUMBER_CONSTRAINT)
    )
}

/// One attempt at the purchase transaction.
///
/// # Process
///
/// 1. Start database transaction
/// 2. Lock the listing and require status `active`
/// 3. Insert the purchase as `PENDING` at the listing's current price
/// 4. Flip the listing to `reserved`
/// 5. Open the buyer/seller chat room
/// 6. Commit
async fn insert_purchase(
    state: &AppState,
    buyer_id: Uuid,
    listing_id: Uuid,
    order_number: &str,
) -> Result<Purchase, AppError> {
    let mut tx = state.pool.begin().await?;

    // Lock the listing so two buyers cannot reserve it at once
    let row: Option<(Uuid, i64, String)> = sqlx::query_as(
        "SELECT seller_id, price_cents, status FROM listings WHERE id = $1 FOR UPDATE",
    )
    .bind(listing_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some((seller_id, price_cents, listing_status)) = row else {
        return Err(AppError::ListingNotFound);
    };
    if listing_status == listing::status::DELETED {
        return Err(AppError::ListingNotFound);
    }
    if seller_id == buyer_id {
        return Err(AppError::InvalidRequest(
            "Cannot purchase your own listing".to_string(),
        ));
    }
    if listing_status != listing::status::ACTIVE {
        tx.rollback().await?;
        return Err(AppError::ListingUnavailable);
    }

    let purchase = sqlx::query_as::<_, Purchase>(
        r#"
        INSERT INTO purchases (order_number, listing_id, buyer_id, seller_id, price_cents, status)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(order_number)
    .bind(listing_id)
    .bind(buyer_id)
    .bind(seller_id)
    .bind(price_cents)
    .bind(status::PENDING)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE listings SET status = $2, updated_at = NOW() WHERE id = $1")
        .bind(listing_id)
        .bind(listing::status::RESERVED)
        .execute(&mut *tx)
        .await?;

    // One chat room per order
    sqlx::query("INSERT INTO rooms (purchase_id, buyer_id, seller_id) VALUES ($1, $2, $3)")
        .bind(purchase.id)
        .bind(buyer_id)
        .bind(seller_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(purchase)
}

/// Complete a purchase: `PENDING` → `COMPLETED`.
///
/// Marks the listing `sold` and records the platform fee. Reached from two
/// places: the seller's complete endpoint and a DONE payment webhook.
///
/// # Idempotency
///
/// For `PaymentProvider`, a purchase that is already `COMPLETED` or
/// `CONFIRMED` returns unchanged — providers retry webhooks.
pub async fn complete_purchase(
    state: &AppState,
    purchase_id: Uuid,
    actor: CompleteActor,
) -> Result<Purchase, AppError> {
    let mut tx = state.pool.begin().await?;

    let purchase =
        sqlx::query_as::<_, Purchase>("SELECT * FROM purchases WHERE id = $1 FOR UPDATE")
            .bind(purchase_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::PurchaseNotFound)?;

    if let CompleteActor::Seller(user_id) = actor {
        if purchase.seller_id != user_id {
            return Err(AppError::Forbidden);
        }
    }

    if purchase.status != status::PENDING {
        return match actor {
            CompleteActor::PaymentProvider
                if purchase.status == status::COMPLETED
                    || purchase.status == status::CONFIRMED =>
            {
                Ok(purchase)
            }
            _ => Err(AppError::InvalidStatusTransition),
        };
    }

    let purchase = sqlx::query_as::<_, Purchase>(
        "UPDATE purchases SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(purchase_id)
    .bind(status::COMPLETED)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE listings SET status = $2, updated_at = NOW() WHERE id = $1")
        .bind(purchase.listing_id)
        .bind(listing::status::SOLD)
        .execute(&mut *tx)
        .await?;

    // Commission owed by the seller; ON CONFLICT keeps this idempotent
    let fee_cents = purchase.price_cents * state.config.fee_bps / 10_000;
    sqlx::query(
        r#"
        INSERT INTO fees (purchase_id, seller_id, amount_cents)
        VALUES ($1, $2, $3)
        ON CONFLICT (purchase_id) DO NOTHING
        "#,
    )
    .bind(purchase.id)
    .bind(purchase.seller_id)
    .bind(fee_cents)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    notification_service::notify(
        state,
        purchase.buyer_id,
        NotificationKind::PurchaseCompleted,
        &format!("Order {} has been completed", purchase.order_number),
    )
    .await;

    Ok(purchase)
}

/// Confirm a completed purchase: `COMPLETED` → `CONFIRMED`. Buyer only.
pub async fn confirm_purchase(
    state: &AppState,
    purchase_id: Uuid,
    user_id: Uuid,
) -> Result<Purchase, AppError> {
    let mut tx = state.pool.begin().await?;

    let purchase =
        sqlx::query_as::<_, Purchase>("SELECT * FROM purchases WHERE id = $1 FOR UPDATE")
            .bind(purchase_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::PurchaseNotFound)?;

    if purchase.buyer_id != user_id {
        return Err(AppError::Forbidden);
    }
    if purchase.status != status::COMPLETED {
        return Err(AppError::InvalidStatusTransition);
    }

    let purchase = sqlx::query_as::<_, Purchase>(
        "UPDATE purchases SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(purchase_id)
    .bind(status::CONFIRMED)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(purchase)
}

/// Cancel a pending purchase: `PENDING` → `CANCELLED`. Either party.
///
/// The listing goes back to `active` so other buyers can take it.
pub async fn cancel_purchase(
    state: &AppState,
    purchase_id: Uuid,
    user_id: Uuid,
) -> Result<Purchase, AppError> {
    let mut tx = state.pool.begin().await?;

    let purchase =
        sqlx::query_as::<_, Purchase>("SELECT * FROM purchases WHERE id = $1 FOR UPDATE")
            .bind(purchase_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::PurchaseNotFound)?;

    if purchase.buyer_id != user_id && purchase.seller_id != user_id {
        return Err(AppError::Forbidden);
    }
    if purchase.status != status::PENDING {
        return Err(AppError::InvalidStatusTransition);
    }

    let purchase = sqlx::query_as::<_, Purchase>(
        "UPDATE purchases SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(purchase_id)
    .bind(status::CANCELLED)
    .fetch_one(&mut *tx)
    .await?;

    // Only a reservation is undone; a sold listing stays sold
    sqlx::query(
        "UPDATE listings SET status = $2, updated_at = NOW() WHERE id = $1 AND status = $3",
    )
    .bind(purchase.listing_id)
    .bind(listing::status::ACTIVE)
    .bind(listing::status::RESERVED)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(purchase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_number_shape() {
        let n = generate_order_number();
        let parts: Vec<&str> = n.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert_eq!(parts[1].len(), 6);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), ORDER_CODE_LEN);
        assert!(
            parts[2]
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn order_numbers_vary() {
        let a = generate_order_number();
        let b = generate_order_number();
        // Same date prefix, random tail; a collision here is ~1 in 2 billion
        assert_ne!(a, b);
    }

    #[test]
    fn collision_check_ignores_unrelated_errors() {
        // Only an order_number unique violation may trigger a retry;
        // business errors and other database failures must surface
        assert!(!is_order_number_collision(&AppError::ListingUnavailable));
        assert!(!is_order_number_collision(&AppError::PurchaseNotFound));
        assert!(!is_order_number_collision(&AppError::Database(
            sqlx::Error::RowNotFound
        )));
    }
}
