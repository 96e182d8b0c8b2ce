use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A printable letter template stored in the database.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct LetterTemplate {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
