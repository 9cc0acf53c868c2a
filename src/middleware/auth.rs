//! Session authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract the session token from the Authorization header or cookies
//! 2. Verify its HMAC signature and expiry
//! 3. Load the user and inject authentication context into the request
//! 4. Reject unauthorized requests with HTTP 401
//!
//! Tokens arrive in any of three places, checked in order:
//! `Authorization: Bearer <token>`, then the `session` cookie, then the
//! `access_token` cookie (older clients).

use crate::{db::AppState, error::AppError, services::session};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Cookie names carrying the session token. Login sets all of them with the
/// same value; the middleware accepts whichever is present.
pub const SESSION_COOKIES: [&str; 2] = ["session", "access_token"];

/// Authentication context attached to authenticated requests.
///
/// This struct is inserted into the request's extension map and can be
/// extracted by route handlers to know who made the request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// ID of the authenticated user
    pub user_id: Uuid,

    /// Display name of the authenticated user
    pub nickname: String,

    /// Whether the user may access /api/v1/admin routes
    pub is_admin: bool,
}

/// Session authentication middleware function.
///
/// # Flow
///
/// 1. Extract the token from `Authorization: Bearer` or a session cookie
/// 2. Verify signature and expiry
/// 3. Load the user row; suspended or deleted users are rejected
/// 4. Inject `AuthContext` into request, call next handler
///
/// # Returns
///
/// - `Ok(Response)` if authenticated successfully (calls next handler)
/// - `Err(AppError::InvalidSession)` if authentication fails (returns 401)
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(&request).ok_or(AppError::InvalidSession)?;

    let user_id = session::verify_token(&state.config.session_secret, &token)?;

    // (nickname, is_admin, is_suspended)
    let user: (String, bool, bool) =
        sqlx::query_as("SELECT nickname, is_admin, is_suspended FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&state.pool)
            .await?
            .ok_or(AppError::InvalidSession)?;

    let (nickname, is_admin, is_suspended) = user;
    if is_suspended {
        return Err(AppError::InvalidSession);
    }

    request.extensions_mut().insert(AuthContext {
        user_id,
        nickname,
        is_admin,
    });

    Ok(next.run(request).await)
}

/// Admin gate, layered after `auth_middleware` on /api/v1/admin routes.
///
/// Returns 403 for authenticated non-admin users.
pub async fn admin_middleware(request: Request, next: Next) -> Result<Response, AppError> {
    let is_admin = request
        .extensions()
        .get::<AuthContext>()
        .map(|auth| auth.is_admin)
        .unwrap_or(false);

    if !is_admin {
        return Err(AppError::Forbidden);
    }

    Ok(next.run(request).await)
}

/// Pull the session token out of a request: bearer header first, then the
/// session cookies in order.
fn extract_token(request: &Request) -> Option<String> {
    let headers = request.headers();

    if let Some(bearer) = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
    {
        return Some(bearer.to_string());
    }

    let cookie_header = headers.get("Cookie").and_then(|h| h.to_str().ok())?;
    for name in SESSION_COOKIES {
        if let Some(value) = cookie_value(cookie_header, name) {
            return Some(value.to_string());
        }
    }

    None
}

/// Find a cookie's value in a `Cookie:` header.
fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then_some(v)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_value_parses_header() {
        let header = "theme=dark; session=abc.123.def; access_token=xyz";
        assert_eq!(cookie_value(header, "session"), Some("abc.123.def"));
        assert_eq!(cookie_value(header, "access_token"), Some("xyz"));
        assert_eq!(cookie_value(header, "missing"), None);
    }

    #[test]
    fn cookie_value_ignores_name_substrings() {
        // "access_token" must not match inside "xaccess_token"
        let header = "xaccess_token=wrong; access_token=right";
        assert_eq!(cookie_value(header, "access_token"), Some("right"));
    }
}
