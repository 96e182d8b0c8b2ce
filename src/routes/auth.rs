use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::auth::extractor::AuthAccount;
use crate::auth::jwt::{encode_token, Claims, ACCESS_TOKEN_MINUTES};
use crate::auth::password::{self, MIN_PASSWORD_LEN};
use crate::db;
use crate::db::accounts::NewAccount;
use crate::error::{is_unique_violation, AppError};
use crate::extract::Json;
use crate::middleware::audit;
use crate::models::Account;
use crate::state::SharedState;

const REFRESH_TOKEN_DAYS: i64 = 7;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub account: Account,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn auth_cookies(access_token: &str, refresh_token: &str) -> CookieJar {
    let access = Cookie::build(("access_token", access_token.to_string()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::minutes(ACCESS_TOKEN_MINUTES))
        .build();

    let refresh = Cookie::build(("refresh_token", refresh_token.to_string()))
        .path("/api/v1/auth")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::days(REFRESH_TOKEN_DAYS))
        .build();

    CookieJar::new().add(access).add(refresh)
}

fn clear_auth_cookies() -> CookieJar {
    let access = Cookie::build(("access_token", ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build();
    let refresh = Cookie::build(("refresh_token", ""))
        .path("/api/v1/auth")
        .max_age(time::Duration::ZERO)
        .build();
    CookieJar::new().add(access).add(refresh)
}

fn generate_refresh_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn validate_new_account(req: &RegisterRequest) -> Result<(), AppError> {
    if req.email.trim().is_empty()
        || req.username.trim().is_empty()
        || req.first_name.trim().is_empty()
        || req.last_name.trim().is_empty()
    {
        return Err(AppError::Validation(
            "email, username, first_name and last_name are required".to_string(),
        ));
    }
    if !req.email.contains('@') {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    validate_password(&req.password)
}

pub(crate) fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub(crate) fn account_conflict(e: sqlx::Error) -> AppError {
    if is_unique_violation(&e) {
        AppError::Validation("An account with this email or username already exists".to_string())
    } else {
        AppError::from(e)
    }
}

async fn issue_tokens(
    state: &SharedState,
    account: Account,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let claims = Claims::for_account(&account);
    let access_token = encode_token(&claims, &state.config.jwt_secret).map_err(AppError::Internal)?;

    let refresh = generate_refresh_token();
    db::refresh_tokens::create(
        &state.pool,
        account.id,
        &hash_token(&refresh),
        Utc::now() + Duration::days(REFRESH_TOKEN_DAYS),
    )
    .await?;

    let jar = auth_cookies(&access_token, &refresh);
    Ok((
        jar,
        Json(AuthResponse {
            access_token,
            refresh_token: refresh,
            account,
        }),
    ))
}

/// Creates the first account as superuser. Closed once any account exists.
pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), AppError> {
    validate_new_account(&req)?;
    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;
    let email = normalize_email(&req.email);

    // Advisory lock prevents concurrent bootstrap registrations
    let mut tx = state.pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock(1)")
        .execute(&mut *tx)
        .await?;

    if db::accounts::count_all(&mut *tx).await? > 0 {
        return Err(AppError::Forbidden(
            "Registration is disabled. Ask an administrator for an account.".to_string(),
        ));
    }

    let account = db::accounts::create(
        &mut *tx,
        &NewAccount {
            email: &email,
            username: req.username.trim(),
            first_name: req.first_name.trim(),
            last_name: req.last_name.trim(),
            password_hash: &pw_hash,
            is_staff: true,
            is_superuser: true,
        },
    )
    .await
    .map_err(account_conflict)?;

    tx.commit().await?;

    tracing::info!("Bootstrap account {} registered", account.email);
    audit::log_event(
        &state.pool,
        Some(account.id),
        "account.registered",
        "account",
        Some(account.id),
        None,
    )
    .await;

    let (jar, body) = issue_tokens(&state, account).await?;
    Ok((StatusCode::CREATED, jar, body))
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let email = normalize_email(&req.email);

    if state.login_limiter.check(&email).is_err() {
        return Err(AppError::RateLimited(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    let account = db::accounts::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| {
            state.login_limiter.record_failure(&email);
            AppError::Unauthorized("Username/password combination invalid.".to_string())
        })?;

    let valid = password::verify(&req.password, &account.password_hash).map_err(AppError::Internal)?;
    if !valid {
        state.login_limiter.record_failure(&email);
        return Err(AppError::Unauthorized(
            "Username/password combination invalid.".to_string(),
        ));
    }

    if !account.is_active {
        return Err(AppError::Unauthorized(
            "This account has been disabled.".to_string(),
        ));
    }

    state.login_limiter.clear(&email);

    audit::log_event(
        &state.pool,
        Some(account.id),
        "account.login",
        "account",
        Some(account.id),
        None,
    )
    .await;

    issue_tokens(&state, account).await
}

pub async fn refresh(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let refresh_value = jar
        .get("refresh_token")
        .map(|c| c.value().to_string())
        .ok_or_else(|| AppError::Unauthorized("Missing refresh token".to_string()))?;

    let stored = db::refresh_tokens::find_by_hash(&state.pool, &hash_token(&refresh_value))
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".to_string()))?;

    if stored.expires_at < Utc::now() {
        return Err(AppError::Unauthorized("Refresh token expired".to_string()));
    }

    if stored.used || !db::refresh_tokens::mark_used(&state.pool, stored.id).await? {
        tracing::warn!(
            "Refresh token reuse detected for account {}. Revoking all sessions.",
            stored.account_id
        );
        db::refresh_tokens::delete_all_for_account(&state.pool, stored.account_id).await?;
        return Err(AppError::Unauthorized(
            "Refresh token reuse detected. All sessions revoked.".to_string(),
        ));
    }

    let account = db::accounts::find_by_id(&state.pool, stored.account_id)
        .await?
        .filter(|a| a.is_active)
        .ok_or_else(|| AppError::Unauthorized("Account not found or disabled".to_string()))?;

    issue_tokens(&state, account).await
}

pub async fn logout(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    if let Some(cookie) = jar.get("refresh_token") {
        db::refresh_tokens::delete_by_hash(&state.pool, &hash_token(cookie.value())).await?;
    }

    Ok((
        clear_auth_cookies(),
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    ))
}

pub async fn me(
    auth: AuthAccount,
    State(state): State<SharedState>,
) -> Result<Json<Account>, AppError> {
    let account = db::accounts::find_by_id(&state.pool, auth.account_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;
    Ok(Json(account))
}

pub async fn change_password(
    auth: AuthAccount,
    State(state): State<SharedState>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    validate_password(&req.new_password)?;

    let account = db::accounts::find_by_id(&state.pool, auth.account_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account not found".to_string()))?;

    let valid = password::verify(&req.current_password, &account.password_hash)
        .map_err(AppError::Internal)?;
    if !valid {
        return Err(AppError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let pw_hash = password::hash(&req.new_password).map_err(AppError::Internal)?;
    db::accounts::update_password(&state.pool, account.id, &pw_hash).await?;
    db::refresh_tokens::delete_all_for_account(&state.pool, account.id).await?;

    audit::log_event(
        &state.pool,
        Some(account.id),
        "account.password_changed",
        "account",
        Some(account.id),
        None,
    )
    .await;

    issue_tokens(&state, account).await
}
