use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    /// Months between an employee's last appointment and the next reminder.
    pub reminder_interval: i32,
    /// Only populated by listing queries.
    #[sqlx(default)]
    #[serde(default)]
    pub employee_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
