use axum::extract::State;
use axum::http::StatusCode;
use uuid::Uuid;

use crate::auth::extractor::AuthAccount;
use crate::db;
use crate::db::employees::EmployeeFilter;
use crate::error::{is_foreign_key_violation, is_unique_violation, AppError};
use crate::extract::{Json, Path, Query};
use crate::middleware::audit;
use crate::models::{Employee, EmployeeInput};
use crate::reminder;
use crate::state::SharedState;

fn employee_conflict(e: sqlx::Error) -> AppError {
    if is_unique_violation(&e) {
        AppError::Validation("An employee with this employee_id already exists".to_string())
    } else if is_foreign_key_violation(&e) {
        AppError::Validation("Unknown department".to_string())
    } else {
        AppError::from(e)
    }
}

pub async fn list(
    _auth: AuthAccount,
    State(state): State<SharedState>,
    Query(filter): Query<EmployeeFilter>,
) -> Result<Json<Vec<Employee>>, AppError> {
    let employees = db::employees::list(&state.pool, &filter).await?;
    Ok(Json(employees))
}

pub async fn create(
    auth: AuthAccount,
    State(state): State<SharedState>,
    Json(input): Json<EmployeeInput>,
) -> Result<(StatusCode, Json<Employee>), AppError> {
    input.validate().map_err(AppError::Validation)?;

    let department = db::departments::find_by_id(&state.pool, input.department_id)
        .await?
        .ok_or_else(|| AppError::Validation("Unknown department".to_string()))?;
    let interval = input.reminder_interval.unwrap_or(department.reminder_interval);

    let employee = db::employees::create(&state.pool, &input, interval)
        .await
        .map_err(employee_conflict)?;

    tracing::info!(employee = %employee.id, "employee {} created", employee.employee_id);
    audit::log_event(
        &state.pool,
        Some(auth.account_id),
        "employee.created",
        "employee",
        Some(employee.id),
        None,
    )
    .await;

    Ok((StatusCode::CREATED, Json(employee)))
}

pub async fn get(
    _auth: AuthAccount,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Employee>, AppError> {
    let employee = db::employees::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;
    Ok(Json(employee))
}

/// A changed interval moves `next_reminder` with it.
pub async fn update(
    auth: AuthAccount,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(input): Json<EmployeeInput>,
) -> Result<Json<Employee>, AppError> {
    input.validate().map_err(AppError::Validation)?;

    let mut tx = state.pool.begin().await?;
    let existing = reminder::lock_employee(&mut tx, id).await?;
    let interval = input.reminder_interval.unwrap_or(existing.reminder_interval);

    let mut employee = db::employees::update(&mut *tx, id, &input, interval)
        .await
        .map_err(employee_conflict)?;

    if interval != existing.reminder_interval {
        employee = reminder::recompute(&mut tx, id).await?;
    }
    tx.commit().await?;

    audit::log_event(
        &state.pool,
        Some(auth.account_id),
        "employee.updated",
        "employee",
        Some(id),
        None,
    )
    .await;

    Ok(Json(employee))
}

pub async fn delete(
    auth: AuthAccount,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let appointments = db::appointments::count_for_employee(&state.pool, id).await?;
    let removed = db::employees::delete(&state.pool, id).await?;
    if removed == 0 {
        return Err(AppError::NotFound("Employee not found".to_string()));
    }

    audit::log_event(
        &state.pool,
        Some(auth.account_id),
        "employee.deleted",
        "employee",
        Some(id),
        Some(serde_json::json!({ "appointments_removed": appointments })),
    )
    .await;

    Ok(Json(serde_json::json!({ "message": "Deleted" })))
}
