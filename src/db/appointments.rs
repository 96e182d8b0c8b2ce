use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::Appointment;

#[derive(Debug, Default, Deserialize)]
pub struct AppointmentFilter {
    #[serde(with = "crate::dates::option", default)]
    pub min_date: Option<NaiveDate>,
    #[serde(with = "crate::dates::option", default)]
    pub max_date: Option<NaiveDate>,
    pub employee_id: Option<Uuid>,
}

pub async fn list(
    pool: &PgPool,
    filter: &AppointmentFilter,
) -> Result<Vec<Appointment>, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM appointments WHERE true");

    if let Some(date) = filter.min_date {
        qb.push(" AND date >= ").push_bind(date);
    }
    if let Some(date) = filter.max_date {
        qb.push(" AND date <= ").push_bind(date);
    }
    if let Some(id) = filter.employee_id {
        qb.push(" AND employee_id = ").push_bind(id);
    }

    qb.push(" ORDER BY date, created_at");

    qb.build_query_as::<Appointment>().fetch_all(pool).await
}

pub async fn find_by_id<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<Appointment>, sqlx::Error> {
    sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// The employee's most recent appointment. Same-day appointments resolve to
/// the one created last.
pub async fn latest_for_employee<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    employee_id: Uuid,
) -> Result<Option<Appointment>, sqlx::Error> {
    sqlx::query_as::<_, Appointment>(
        "SELECT * FROM appointments WHERE employee_id = $1
         ORDER BY date DESC, created_at DESC LIMIT 1",
    )
    .bind(employee_id)
    .fetch_optional(executor)
    .await
}

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    employee_id: Uuid,
    date: NaiveDate,
    note: &str,
    confirmed: bool,
) -> Result<Appointment, sqlx::Error> {
    sqlx::query_as::<_, Appointment>(
        "INSERT INTO appointments (employee_id, date, note, confirmed)
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(employee_id)
    .bind(date)
    .bind(note)
    .bind(confirmed)
    .fetch_one(executor)
    .await
}

pub async fn update<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    employee_id: Uuid,
    date: NaiveDate,
    note: &str,
    confirmed: bool,
) -> Result<Appointment, sqlx::Error> {
    sqlx::query_as::<_, Appointment>(
        "UPDATE appointments SET employee_id = $2, date = $3, note = $4, confirmed = $5,
             updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(employee_id)
    .bind(date)
    .bind(note)
    .bind(confirmed)
    .fetch_one(executor)
    .await
}

/// Returns the deleted row so its employee can be recomputed.
pub async fn delete<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<Appointment>, sqlx::Error> {
    sqlx::query_as::<_, Appointment>("DELETE FROM appointments WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn count_for_employee(pool: &PgPool, employee_id: Uuid) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM appointments WHERE employee_id = $1")
        .bind(employee_id)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}
