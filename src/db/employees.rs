use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{Employee, EmployeeInput, Gender};

/// Optional list filters. Name filters match substrings, `employee_id` matches a prefix.
#[derive(Debug, Default, Deserialize)]
pub struct EmployeeFilter {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub employee_id: Option<String>,
    pub gender: Option<Gender>,
    #[serde(with = "crate::dates::option", default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(with = "crate::dates::option", default)]
    pub date_of_entry: Option<NaiveDate>,
    pub wants_reminder: Option<bool>,
    pub active: Option<bool>,
    pub department_id: Option<Uuid>,
    /// next_reminder on or after this date
    #[serde(with = "crate::dates::option", default)]
    pub reminder_after: Option<NaiveDate>,
    /// next_reminder on or before this date
    #[serde(with = "crate::dates::option", default)]
    pub reminder_before: Option<NaiveDate>,
}

pub async fn list(pool: &PgPool, filter: &EmployeeFilter) -> Result<Vec<Employee>, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM employees WHERE true");

    if let Some(name) = &filter.first_name {
        qb.push(" AND first_name ILIKE ")
            .push_bind(format!("%{}%", escape_like(name)));
    }
    if let Some(name) = &filter.last_name {
        qb.push(" AND last_name ILIKE ")
            .push_bind(format!("%{}%", escape_like(name)));
    }
    if let Some(prefix) = &filter.employee_id {
        qb.push(" AND employee_id LIKE ")
            .push_bind(format!("{}%", escape_like(prefix)));
    }
    if let Some(gender) = filter.gender {
        qb.push(" AND gender = ").push_bind(gender.as_str());
    }
    if let Some(date) = filter.date_of_birth {
        qb.push(" AND date_of_birth = ").push_bind(date);
    }
    if let Some(date) = filter.date_of_entry {
        qb.push(" AND date_of_entry = ").push_bind(date);
    }
    if let Some(flag) = filter.wants_reminder {
        qb.push(" AND wants_reminder = ").push_bind(flag);
    }
    if let Some(flag) = filter.active {
        qb.push(" AND active = ").push_bind(flag);
    }
    if let Some(id) = filter.department_id {
        qb.push(" AND department_id = ").push_bind(id);
    }
    if let Some(date) = filter.reminder_after {
        qb.push(" AND next_reminder >= ").push_bind(date);
    }
    if let Some(date) = filter.reminder_before {
        qb.push(" AND next_reminder <= ").push_bind(date);
    }

    qb.push(" ORDER BY last_name, first_name");

    qb.build_query_as::<Employee>().fetch_all(pool).await
}

pub async fn find_by_id<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<Employee>, sqlx::Error> {
    sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Row-locks the employee for the rest of the transaction. The lock does not
/// conflict with the key-share locks taken by appointment inserts.
pub async fn find_for_update(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<Option<Employee>, sqlx::Error> {
    sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1 FOR NO KEY UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await
}

/// New employees start without a reminder date.
pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    input: &EmployeeInput,
    reminder_interval: i32,
) -> Result<Employee, sqlx::Error> {
    sqlx::query_as::<_, Employee>(
        "INSERT INTO employees (employee_id, first_name, last_name, gender, date_of_birth,
             date_of_entry, date_of_exit, notes, active, wants_reminder, reminder_interval,
             department_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING *",
    )
    .bind(&input.employee_id)
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(input.gender.as_str())
    .bind(input.date_of_birth)
    .bind(input.date_of_entry)
    .bind(input.date_of_exit)
    .bind(&input.notes)
    .bind(input.active)
    .bind(input.wants_reminder)
    .bind(reminder_interval)
    .bind(input.department_id)
    .fetch_one(executor)
    .await
}

pub async fn update<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    input: &EmployeeInput,
    reminder_interval: i32,
) -> Result<Employee, sqlx::Error> {
    sqlx::query_as::<_, Employee>(
        "UPDATE employees SET employee_id = $2, first_name = $3, last_name = $4, gender = $5,
             date_of_birth = $6, date_of_entry = $7, date_of_exit = $8, notes = $9,
             active = $10, wants_reminder = $11, reminder_interval = $12,
             department_id = $13, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&input.employee_id)
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(input.gender.as_str())
    .bind(input.date_of_birth)
    .bind(input.date_of_entry)
    .bind(input.date_of_exit)
    .bind(&input.notes)
    .bind(input.active)
    .bind(input.wants_reminder)
    .bind(reminder_interval)
    .bind(input.department_id)
    .fetch_one(executor)
    .await
}

/// Persist the reminder fields computed by the scheduler.
pub async fn set_reminder<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    reminder_interval: i32,
    next_reminder: Option<NaiveDate>,
) -> Result<Employee, sqlx::Error> {
    sqlx::query_as::<_, Employee>(
        "UPDATE employees SET reminder_interval = $2, next_reminder = $3, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(reminder_interval)
    .bind(next_reminder)
    .fetch_one(executor)
    .await
}

/// Appointments go with the employee.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM employees WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub(crate) fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_patterns_are_escaped() {
        assert_eq!(escape_like("50%_a\\b"), "50\\%\\_a\\\\b");
    }

    #[test]
    fn filter_accepts_both_date_formats_and_enums() {
        let filter: EmployeeFilter = serde_json::from_value(serde_json::json!({
            "last_name": "Berg",
            "gender": "female",
            "active": true,
            "reminder_before": "31.12.2024",
        }))
        .unwrap();
        assert_eq!(filter.gender, Some(Gender::Female));
        assert_eq!(filter.reminder_before, NaiveDate::from_ymd_opt(2024, 12, 31));
        assert_eq!(filter.reminder_after, None);
    }
}
