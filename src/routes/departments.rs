use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extractor::AuthAccount;
use crate::db;
use crate::error::{is_foreign_key_violation, is_unique_violation, AppError};
use crate::extract::{Json, Path};
use crate::middleware::audit;
use crate::models::Department;
use crate::state::SharedState;

const DEFAULT_REMINDER_INTERVAL: i32 = 24;

#[derive(Deserialize)]
pub struct DepartmentInput {
    pub name: String,
    pub reminder_interval: Option<i32>,
}

impl DepartmentInput {
    fn validate(&self) -> Result<i32, AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("name is required".to_string()));
        }
        let interval = self.reminder_interval.unwrap_or(DEFAULT_REMINDER_INTERVAL);
        if interval < 0 {
            return Err(AppError::Validation(
                "reminder_interval must not be negative".to_string(),
            ));
        }
        Ok(interval)
    }
}

fn department_conflict(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::RowNotFound => AppError::NotFound("Department not found".to_string()),
        ref err if is_unique_violation(err) => {
            AppError::Validation("A department with this name already exists".to_string())
        }
        _ => AppError::from(e),
    }
}

pub async fn list(
    _auth: AuthAccount,
    State(state): State<SharedState>,
) -> Result<Json<Vec<Department>>, AppError> {
    let departments = db::departments::list(&state.pool).await?;
    Ok(Json(departments))
}

pub async fn create(
    auth: AuthAccount,
    State(state): State<SharedState>,
    Json(req): Json<DepartmentInput>,
) -> Result<(StatusCode, Json<Department>), AppError> {
    let interval = req.validate()?;

    let department = db::departments::create(&state.pool, req.name.trim(), interval)
        .await
        .map_err(department_conflict)?;

    audit::log_event(
        &state.pool,
        Some(auth.account_id),
        "department.created",
        "department",
        Some(department.id),
        None,
    )
    .await;

    Ok((StatusCode::CREATED, Json(department)))
}

pub async fn get(
    _auth: AuthAccount,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Department>, AppError> {
    let department = db::departments::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Department not found".to_string()))?;
    Ok(Json(department))
}

pub async fn update(
    auth: AuthAccount,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DepartmentInput>,
) -> Result<Json<Department>, AppError> {
    let interval = req.validate()?;

    db::departments::update(&state.pool, id, req.name.trim(), interval)
        .await
        .map_err(department_conflict)?;

    let department = db::departments::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Department not found".to_string()))?;

    audit::log_event(
        &state.pool,
        Some(auth.account_id),
        "department.updated",
        "department",
        Some(id),
        Some(serde_json::json!({ "reminder_interval": interval })),
    )
    .await;

    Ok(Json(department))
}

pub async fn delete(
    auth: AuthAccount,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let removed = db::departments::delete(&state.pool, id)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::Validation("Department still has employees".to_string())
            } else {
                AppError::from(e)
            }
        })?;

    if removed == 0 {
        return Err(AppError::NotFound("Department not found".to_string()));
    }

    audit::log_event(
        &state.pool,
        Some(auth.account_id),
        "department.deleted",
        "department",
        Some(id),
        None,
    )
    .await;

    Ok(Json(serde_json::json!({ "message": "Deleted" })))
}
