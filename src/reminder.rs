use chrono::{Months, NaiveDate};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::db;
use crate::error::AppError;
use crate::models::{Appointment, Employee};

/// Calendar-correct month addition. Days past the end of the target month are
/// clamped to its last day, so Jan 31 + 1 month is the end of February.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// The reminder date following an appointment on `latest`: that date plus
/// `interval_months` months.
pub fn next_reminder(latest: NaiveDate, interval_months: i32) -> Result<NaiveDate, AppError> {
    let months = u32::try_from(interval_months).map_err(|_| {
        AppError::Validation(format!(
            "reminder_interval must not be negative, got {interval_months}"
        ))
    })?;
    add_months(latest, months).ok_or_else(|| {
        AppError::Validation(format!(
            "{latest} plus {months} months is outside the supported date range"
        ))
    })
}

/// Lock the employee row for the rest of the transaction. Appointment writes
/// call this before touching the appointments table.
pub async fn lock_employee(conn: &mut PgConnection, employee_id: Uuid) -> Result<Employee, AppError> {
    db::employees::find_for_update(conn, employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))
}

/// Lock several employees in a stable order.
pub async fn lock_employees(conn: &mut PgConnection, ids: &[Uuid]) -> Result<Vec<Employee>, AppError> {
    let mut ids = ids.to_vec();
    ids.sort();
    ids.dedup();

    let mut locked = Vec::with_capacity(ids.len());
    for id in ids {
        locked.push(lock_employee(conn, id).await?);
    }
    Ok(locked)
}

/// Recompute after a new appointment. The employee takes over its department's
/// current interval first. Updates and deletes keep the stored interval.
pub async fn on_appointment_created(
    conn: &mut PgConnection,
    appointment: &Appointment,
) -> Result<Employee, AppError> {
    let employee = lock_employee(conn, appointment.employee_id).await?;
    let department = db::departments::find_by_id(&mut *conn, employee.department_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Department not found".to_string()))?;

    let interval = department.reminder_interval;
    let latest = latest_appointment_date(conn, employee.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee has no appointments".to_string()))?;
    let next = next_reminder(latest, interval)?;

    let updated = db::employees::set_reminder(&mut *conn, employee.id, interval, Some(next)).await?;
    tracing::info!(
        employee = %updated.id,
        %next,
        interval,
        "next reminder scheduled after new appointment"
    );
    Ok(updated)
}

/// Recompute after an appointment changed. If it moved to another employee,
/// the previous owner is recomputed from what it has left.
pub async fn on_appointment_updated(
    conn: &mut PgConnection,
    appointment: &Appointment,
    previous_employee_id: Uuid,
) -> Result<Employee, AppError> {
    let employee = recompute(conn, appointment.employee_id).await?;
    if previous_employee_id != appointment.employee_id {
        recompute(conn, previous_employee_id).await?;
    }
    Ok(employee)
}

/// Recompute after an appointment was removed.
pub async fn on_appointment_deleted(
    conn: &mut PgConnection,
    employee_id: Uuid,
) -> Result<Employee, AppError> {
    recompute(conn, employee_id).await
}

/// Recompute with the employee's stored interval. Clears the reminder when no
/// appointments remain.
pub async fn recompute(conn: &mut PgConnection, employee_id: Uuid) -> Result<Employee, AppError> {
    let employee = lock_employee(conn, employee_id).await?;
    let interval = employee.reminder_interval;

    let next = match latest_appointment_date(conn, employee.id).await? {
        Some(latest) => Some(next_reminder(latest, interval)?),
        None => None,
    };

    if next == employee.next_reminder {
        return Ok(employee);
    }

    let updated = db::employees::set_reminder(&mut *conn, employee.id, interval, next).await?;
    match next {
        Some(date) => tracing::info!(employee = %updated.id, next = %date, interval, "next reminder recomputed"),
        None => tracing::info!(employee = %updated.id, "next reminder cleared, no appointments left"),
    }
    Ok(updated)
}

async fn latest_appointment_date(
    conn: &mut PgConnection,
    employee_id: Uuid,
) -> Result<Option<NaiveDate>, AppError> {
    Ok(db::appointments::latest_for_employee(&mut *conn, employee_id)
        .await?
        .map(|a| a.date))
}
