use axum::extract::State;
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extractor::AuthAccount;
use crate::db;
use crate::db::appointments::AppointmentFilter;
use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::middleware::audit;
use crate::models::Appointment;
use crate::reminder;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct AppointmentInput {
    pub employee_id: Uuid,
    #[serde(with = "crate::dates")]
    pub date: NaiveDate,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub confirmed: bool,
}

fn unknown_employee(e: AppError) -> AppError {
    match e {
        AppError::NotFound(_) => AppError::Validation("Unknown employee".to_string()),
        other => other,
    }
}

pub async fn list(
    _auth: AuthAccount,
    State(state): State<SharedState>,
    Query(filter): Query<AppointmentFilter>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let appointments = db::appointments::list(&state.pool, &filter).await?;
    Ok(Json(appointments))
}

pub async fn create(
    auth: AuthAccount,
    State(state): State<SharedState>,
    Json(req): Json<AppointmentInput>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let mut tx = state.pool.begin().await?;
    reminder::lock_employee(&mut tx, req.employee_id)
        .await
        .map_err(unknown_employee)?;

    let appointment =
        db::appointments::create(&mut *tx, req.employee_id, req.date, &req.note, req.confirmed)
            .await?;
    reminder::on_appointment_created(&mut tx, &appointment).await?;
    tx.commit().await?;

    audit::log_event(
        &state.pool,
        Some(auth.account_id),
        "appointment.created",
        "appointment",
        Some(appointment.id),
        Some(serde_json::json!({ "employee_id": appointment.employee_id })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(appointment)))
}

pub async fn get(
    _auth: AuthAccount,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = db::appointments::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;
    Ok(Json(appointment))
}

pub async fn update(
    auth: AuthAccount,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AppointmentInput>,
) -> Result<Json<Appointment>, AppError> {
    let mut tx = state.pool.begin().await?;

    let existing = db::appointments::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;
    reminder::lock_employees(&mut tx, &[existing.employee_id, req.employee_id])
        .await
        .map_err(unknown_employee)?;

    // Someone else may have moved it before the locks were granted
    let current = db::appointments::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;
    if current.employee_id != existing.employee_id {
        return Err(AppError::Conflict(
            "The appointment was modified concurrently, please retry".to_string(),
        ));
    }

    let appointment = db::appointments::update(
        &mut *tx,
        id,
        req.employee_id,
        req.date,
        &req.note,
        req.confirmed,
    )
    .await?;
    reminder::on_appointment_updated(&mut tx, &appointment, existing.employee_id).await?;
    tx.commit().await?;

    audit::log_event(
        &state.pool,
        Some(auth.account_id),
        "appointment.updated",
        "appointment",
        Some(id),
        None,
    )
    .await;

    Ok(Json(appointment))
}

pub async fn delete(
    auth: AuthAccount,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let mut tx = state.pool.begin().await?;

    let existing = db::appointments::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;
    reminder::lock_employee(&mut tx, existing.employee_id).await?;

    let removed = db::appointments::delete(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;
    reminder::on_appointment_deleted(&mut tx, removed.employee_id).await?;
    tx.commit().await?;

    audit::log_event(
        &state.pool,
        Some(auth.account_id),
        "appointment.deleted",
        "appointment",
        Some(id),
        Some(serde_json::json!({ "employee_id": removed.employee_id })),
    )
    .await;

    Ok(Json(serde_json::json!({ "message": "Deleted" })))
}
