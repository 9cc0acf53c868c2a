//! Session tokens and password hashing.
//!
//! Sessions are stateless signed tokens rather than database rows:
//!
//! ```text
//! <user-uuid>.<expires-unix>.<hex(hmac_sha256(secret, "<user-uuid>.<expires-unix>"))>
//! ```
//!
//! The same token is accepted from the Authorization header and from the
//! `session` / `access_token` cookies. Verification is constant-time via
//! `Mac::verify_slice`.
//!
//! Passwords are stored as `"<salt-hex>$<hex(sha256(salt || password))>"`
//! with a 16-byte random salt.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Hash a password with a fresh random salt.
///
/// # Output
///
/// `"<32 hex chars>$<64 hex chars>"`
pub fn hash_password(password: &str) -> String {
    let salt: [u8; 16] = rand::random();

    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());

    format!("{}${}", hex::encode(salt), hex::encode(hasher.finalize()))
}

/// Check a password against a stored `"salt$digest"` hash.
///
/// Returns false for malformed stored values instead of erroring; a bad row
/// should read as a failed login, not a 500.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, digest_hex)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };

    let mut hasher = Sha256::new();
    hasher.update(&salt);
    hasher.update(password.as_bytes());

    hex::encode(hasher.finalize()) == digest_hex
}

/// Issue a signed session token for a user, valid for `ttl_hours`.
pub fn issue_token(secret: &str, user_id: Uuid, ttl_hours: i64) -> String {
    let expires_at = Utc::now().timestamp() + ttl_hours * 3600;
    let payload = format!("{user_id}.{expires_at}");

    format!("{payload}.{}", sign(secret, &payload))
}

/// Verify a session token and return the user id it was issued for.
///
/// # Errors
///
/// `InvalidSession` when the token is malformed, the signature doesn't
/// match, or the expiry has passed.
pub fn verify_token(secret: &str, token: &str) -> Result<Uuid, AppError> {
    let mut parts = token.splitn(3, '.');
    let (Some(user_part), Some(expires_part), Some(sig_part)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return Err(AppError::InvalidSession);
    };

    let user_id = Uuid::parse_str(user_part).map_err(|_| AppError::InvalidSession)?;
    let expires_at: i64 = expires_part.parse().map_err(|_| AppError::InvalidSession)?;
    let sig = hex::decode(sig_part).map_err(|_| AppError::InvalidSession)?;

    // Constant-time signature check over the exact payload we would sign
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC key length is valid");
    mac.update(format!("{user_part}.{expires_part}").as_bytes());
    mac.verify_slice(&sig).map_err(|_| AppError::InvalidSession)?;

    if expires_at <= Utc::now().timestamp() {
        return Err(AppError::InvalidSession);
    }

    Ok(user_id)
}

fn sign(secret: &str, payload: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC key length is valid");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let stored = hash_password("hunter22");
        assert!(verify_password("hunter22", &stored));
        assert!(!verify_password("hunter23", &stored));
    }

    #[test]
    fn password_hashes_are_salted() {
        assert_ne!(hash_password("same"), hash_password("same"));
    }

    #[test]
    fn verify_password_tolerates_garbage_rows() {
        assert!(!verify_password("x", "not-a-hash"));
        assert!(!verify_password("x", "zz$zz"));
    }

    #[test]
    fn token_round_trip() {
        let user_id = Uuid::new_v4();
        let token = issue_token("secret", user_id, 1);
        assert_eq!(verify_token("secret", &token).unwrap(), user_id);
    }

    #[test]
    fn token_rejects_wrong_secret() {
        let token = issue_token("secret", Uuid::new_v4(), 1);
        assert!(verify_token("other", &token).is_err());
    }

    #[test]
    fn token_rejects_tampered_expiry() {
        let user_id = Uuid::new_v4();
        let token = issue_token("secret", user_id, 1);
        let (head, sig) = token.rsplit_once('.').unwrap();
        let (uid, _) = head.rsplit_once('.').unwrap();
        let forged = format!("{uid}.9999999999.{sig}");
        assert!(verify_token("secret", &forged).is_err());
    }

    #[test]
    fn token_rejects_expired() {
        let token = issue_token("secret", Uuid::new_v4(), -1);
        assert!(verify_token("secret", &token).is_err());
    }

    #[test]
    fn token_rejects_malformed() {
        assert!(verify_token("secret", "").is_err());
        assert!(verify_token("secret", "a.b").is_err());
        assert!(verify_token("secret", "not-a-uuid.123.abcd").is_err());
    }
}
