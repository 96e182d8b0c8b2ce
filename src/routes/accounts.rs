use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extractor::AuthAccount;
use crate::auth::password;
use crate::auth::permissions::can_edit;
use crate::db;
use crate::db::accounts::NewAccount;
use crate::error::AppError;
use crate::extract::{Json, Path};
use crate::middleware::audit;
use crate::models::Account;
use crate::routes::auth::{
    account_conflict, normalize_email, validate_new_account, validate_password, RegisterRequest,
};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct CreateAccount {
    #[serde(flatten)]
    pub profile: RegisterRequest,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

#[derive(Deserialize)]
pub struct UpdateAccount {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: Option<String>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
}

impl UpdateAccount {
    fn changes_flags(&self) -> bool {
        self.is_active.is_some() || self.is_staff.is_some() || self.is_superuser.is_some()
    }
}

pub async fn list(
    _auth: AuthAccount,
    State(state): State<SharedState>,
) -> Result<Json<Vec<Account>>, AppError> {
    let accounts = db::accounts::list(&state.pool).await?;
    Ok(Json(accounts))
}

pub async fn create(
    auth: AuthAccount,
    State(state): State<SharedState>,
    Json(req): Json<CreateAccount>,
) -> Result<(StatusCode, Json<Account>), AppError> {
    auth.require_superuser()?;
    validate_new_account(&req.profile)?;

    let pw_hash = password::hash(&req.profile.password).map_err(AppError::Internal)?;
    let email = normalize_email(&req.profile.email);

    let account = db::accounts::create(
        &state.pool,
        &NewAccount {
            email: &email,
            username: req.profile.username.trim(),
            first_name: req.profile.first_name.trim(),
            last_name: req.profile.last_name.trim(),
            password_hash: &pw_hash,
            is_staff: req.is_staff || req.is_superuser,
            is_superuser: req.is_superuser,
        },
    )
    .await
    .map_err(account_conflict)?;

    audit::log_event(
        &state.pool,
        Some(auth.account_id),
        "account.created",
        "account",
        Some(account.id),
        None,
    )
    .await;

    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn get(
    _auth: AuthAccount,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Account>, AppError> {
    let account = db::accounts::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;
    Ok(Json(account))
}

pub async fn update(
    auth: AuthAccount,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAccount>,
) -> Result<Json<Account>, AppError> {
    let target = db::accounts::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

    if !can_edit(&auth, &target) {
        return Err(AppError::Forbidden(
            "You may only edit your own account".to_string(),
        ));
    }
    if req.changes_flags() {
        auth.require_superuser()?;
    }
    if req.username.trim().is_empty()
        || req.first_name.trim().is_empty()
        || req.last_name.trim().is_empty()
    {
        return Err(AppError::Validation(
            "username, first_name and last_name are required".to_string(),
        ));
    }

    let pw_hash = match &req.password {
        Some(new_password) => {
            validate_password(new_password)?;
            Some(password::hash(new_password).map_err(AppError::Internal)?)
        }
        None => None,
    };

    let mut tx = state.pool.begin().await?;

    let mut account = db::accounts::update_profile(
        &mut *tx,
        id,
        req.username.trim(),
        req.first_name.trim(),
        req.last_name.trim(),
    )
    .await
    .map_err(account_conflict)?;

    if req.changes_flags() {
        account = db::accounts::update_flags(
            &mut *tx,
            id,
            req.is_active.unwrap_or(account.is_active),
            req.is_staff.unwrap_or(account.is_staff),
            req.is_superuser.unwrap_or(account.is_superuser),
        )
        .await?;
    }

    if let Some(pw_hash) = &pw_hash {
        db::accounts::update_password(&mut *tx, id, pw_hash).await?;
    }
    if !account.is_active || pw_hash.is_some() {
        db::refresh_tokens::delete_all_for_account(&mut *tx, id).await?;
    }

    tx.commit().await?;

    audit::log_event(
        &state.pool,
        Some(auth.account_id),
        "account.updated",
        "account",
        Some(id),
        None,
    )
    .await;

    Ok(Json(account))
}

pub async fn delete(
    auth: AuthAccount,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let target = db::accounts::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

    if !can_edit(&auth, &target) {
        return Err(AppError::Forbidden(
            "You may only delete your own account".to_string(),
        ));
    }

    db::accounts::delete(&state.pool, id).await?;

    audit::log_event(
        &state.pool,
        Some(auth.account_id),
        "account.deleted",
        "account",
        Some(id),
        Some(serde_json::json!({ "email": target.email })),
    )
    .await;

    Ok(Json(serde_json::json!({ "message": "Deleted" })))
}
