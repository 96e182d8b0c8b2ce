use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Department;

const SELECT_WITH_EMPLOYEES: &str = "SELECT d.*,
        ARRAY(SELECT e.id FROM employees e WHERE e.department_id = d.id ORDER BY e.last_name)
            AS employee_ids
     FROM departments d";

pub async fn list(pool: &PgPool) -> Result<Vec<Department>, sqlx::Error> {
    sqlx::query_as::<_, Department>(&format!("{SELECT_WITH_EMPLOYEES} ORDER BY d.name"))
        .fetch_all(pool)
        .await
}

pub async fn find_by_id<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<Department>, sqlx::Error> {
    sqlx::query_as::<_, Department>(&format!("{SELECT_WITH_EMPLOYEES} WHERE d.id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn create(
    pool: &PgPool,
    name: &str,
    reminder_interval: i32,
) -> Result<Department, sqlx::Error> {
    sqlx::query_as::<_, Department>(
        "INSERT INTO departments (name, reminder_interval) VALUES ($1, $2) RETURNING *",
    )
    .bind(name)
    .bind(reminder_interval)
    .fetch_one(pool)
    .await
}

/// Existing employees keep their interval until their next appointment.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    name: &str,
    reminder_interval: i32,
) -> Result<Department, sqlx::Error> {
    sqlx::query_as::<_, Department>(
        "UPDATE departments SET name = $2, reminder_interval = $3, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(name)
    .bind(reminder_interval)
    .fetch_one(pool)
    .await
}

/// Fails with a foreign key violation while employees reference the department.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM departments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
