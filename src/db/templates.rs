use sqlx::PgPool;
use uuid::Uuid;

use crate::models::LetterTemplate;

pub async fn list(pool: &PgPool) -> Result<Vec<LetterTemplate>, sqlx::Error> {
    sqlx::query_as::<_, LetterTemplate>("SELECT * FROM templates ORDER BY name")
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<LetterTemplate>, sqlx::Error> {
    sqlx::query_as::<_, LetterTemplate>("SELECT * FROM templates WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    name: &str,
    description: &str,
    body: &str,
) -> Result<LetterTemplate, sqlx::Error> {
    sqlx::query_as::<_, LetterTemplate>(
        "INSERT INTO templates (name, description, body) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(name)
    .bind(description)
    .bind(body)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    name: &str,
    description: &str,
    body: &str,
) -> Result<LetterTemplate, sqlx::Error> {
    sqlx::query_as::<_, LetterTemplate>(
        "UPDATE templates SET name = $2, description = $3, body = $4, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(name)
    .bind(description)
    .bind(body)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM templates WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
