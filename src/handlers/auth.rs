//! Authentication HTTP handlers.
//!
//! This module implements the account/session API endpoints:
//! - POST /api/v1/auth/signup - Register a new account
//! - POST /api/v1/auth/login - Exchange credentials for a session token
//! - POST /api/v1/auth/logout - Clear session cookies
//!
//! Login returns the token in the JSON body and also mirrors it into the
//! `session` and `access_token` cookies, so both header-auth API clients
//! and cookie-based web clients work against the same endpoints.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
};

use crate::{
    db::AppState,
    error::AppError,
    middleware::auth::SESSION_COOKIES,
    models::user::{LoginRequest, LoginResponse, SignupRequest, User, UserResponse},
    services::session,
};

/// Register a new account.
///
/// # Request Body
///
/// ```json
/// {
///   "email": "buyer@example.com",
///   "password": "hunter22",
///   "nickname": "ticketfan",
///   "phone": "01012345678"
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: the new profile
/// - **Error (400)**: malformed email, short password, bad nickname
/// - **Error (409)**: email or nickname already taken
///
/// # Validation
///
/// - email must contain '@' and be at most 254 characters
/// - password must be at least 8 characters
/// - nickname must be 2 to 30 characters
///
/// Uniqueness is pre-checked for friendly 409s; the unique constraints on
/// `users.email` and `users.nickname` remain the real guarantee.
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = request.email.trim().to_lowercase();
    let nickname = request.nickname.trim().to_string();

    if !email.contains('@') || email.chars().count() > 254 {
        return Err(AppError::InvalidRequest("Invalid email".to_string()));
    }
    if request.password.chars().count() < 8 {
        return Err(AppError::InvalidRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    super::users::validate_nickname(&nickname)?;

    let email_taken: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(&email)
            .fetch_one(&state.pool)
            .await?;
    if email_taken {
        return Err(AppError::EmailTaken);
    }

    let nickname_taken: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE nickname = $1)")
            .bind(&nickname)
            .fetch_one(&state.pool)
            .await?;
    if nickname_taken {
        return Err(AppError::NicknameTaken);
    }

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, password_hash, nickname, phone)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(&email)
    .bind(session::hash_password(&request.password))
    .bind(&nickname)
    .bind(&request.phone)
    .fetch_one(&state.pool)
    .await
    .map_err(signup_conflict)?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Map unique violations from the signup INSERT onto the documented 409s.
///
/// Two signups racing past the pre-checks serialize on the `users.email` /
/// `users.nickname` constraints; the loser should see the same response as
/// if the pre-check had caught it.
fn signup_conflict(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            if db.constraint() == Some("users_nickname_key") {
                AppError::NicknameTaken
            } else {
                AppError::EmailTaken
            }
        }
        other => AppError::Database(other),
    }
}

/// Log in with email and password.
///
/// # Response (200)
///
/// ```json
/// {
///   "token": "550e8400-...1767139200.9f2c...",
///   "user": { "id": "550e8400-...", "nickname": "ticketfan", ... }
/// }
/// ```
///
/// Plus `Set-Cookie: session=...` and `Set-Cookie: access_token=...`
/// carrying the same token (HttpOnly, Max-Age = session TTL).
///
/// # Errors
///
/// 401 for unknown email, wrong password, or a suspended account — the
/// response does not distinguish which.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = request.email.trim().to_lowercase();

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if user.is_suspended || !session::verify_password(&request.password, &user.password_hash) {
        return Err(AppError::InvalidCredentials);
    }

    let token = session::issue_token(
        &state.config.session_secret,
        user.id,
        state.config.session_ttl_hours,
    );

    let max_age = state.config.session_ttl_hours * 3600;
    let cookies = AppendHeaders([
        (SET_COOKIE, session_cookie(SESSION_COOKIES[0], &token, max_age)),
        (SET_COOKIE, session_cookie(SESSION_COOKIES[1], &token, max_age)),
    ]);

    Ok((
        cookies,
        Json(LoginResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// Log out by expiring both session cookies.
///
/// Tokens are stateless, so "logout" means telling the browser to drop
/// them; bearer-header clients just discard the token.
pub async fn logout() -> impl IntoResponse {
    let cookies = AppendHeaders([
        (SET_COOKIE, session_cookie(SESSION_COOKIES[0], "", 0)),
        (SET_COOKIE, session_cookie(SESSION_COOKIES[1], "", 0)),
    ]);

    (cookies, StatusCode::NO_CONTENT)
}

fn session_cookie(name: &str, token: &str, max_age_secs: i64) -> String {
    format!("{name}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_format() {
        let c = session_cookie("session", "tok", 3600);
        assert_eq!(c, "session=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=3600");
    }

    #[test]
    fn logout_cookie_expires_immediately() {
        let c = session_cookie("access_token", "", 0);
        assert!(c.starts_with("access_token=;"));
        assert!(c.ends_with("Max-Age=0"));
    }

    #[test]
    fn signup_conflict_passes_through_other_errors() {
        // Only unique violations become 409s; everything else stays a 500
        match signup_conflict(sqlx::Error::RowNotFound) {
            AppError::Database(_) => {}
            other => panic!("expected Database error, got {other:?}"),
        }
    }
}
