use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Diverse,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Diverse => "diverse",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "diverse" => Some(Gender::Diverse),
            _ => None,
        }
    }
}

impl TryFrom<String> for Gender {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Gender::parse(&value).ok_or_else(|| format!("unknown gender '{value}'"))
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    /// External personnel number.
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    #[sqlx(try_from = "String")]
    pub gender: Gender,
    #[serde(with = "crate::dates")]
    pub date_of_birth: NaiveDate,
    #[serde(with = "crate::dates")]
    pub date_of_entry: NaiveDate,
    #[serde(with = "crate::dates::option", default)]
    pub date_of_exit: Option<NaiveDate>,
    pub notes: String,
    pub active: bool,
    pub wants_reminder: bool,
    pub reminder_interval: i32,
    #[serde(with = "crate::dates::option", default)]
    pub next_reminder: Option<NaiveDate>,
    pub department_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// The client-writable part of this record.
    pub fn to_input(&self) -> EmployeeInput {
        EmployeeInput {
            employee_id: self.employee_id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            gender: self.gender,
            date_of_birth: self.date_of_birth,
            date_of_entry: self.date_of_entry,
            date_of_exit: self.date_of_exit,
            notes: self.notes.clone(),
            active: self.active,
            wants_reminder: self.wants_reminder,
            reminder_interval: Some(self.reminder_interval),
            department_id: self.department_id,
        }
    }
}

/// Create/update payload for an employee. `next_reminder` is derived from
/// appointments and never written by clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeInput {
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    #[serde(with = "crate::dates")]
    pub date_of_birth: NaiveDate,
    #[serde(with = "crate::dates")]
    pub date_of_entry: NaiveDate,
    #[serde(with = "crate::dates::option", default)]
    pub date_of_exit: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default = "default_true")]
    pub wants_reminder: bool,
    /// Falls back to the department's interval when absent.
    #[serde(default)]
    pub reminder_interval: Option<i32>,
    pub department_id: Uuid,
}

impl EmployeeInput {
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("employee_id", &self.employee_id),
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{field} is required"));
            }
        }
        if matches!(self.reminder_interval, Some(n) if n < 0) {
            return Err("reminder_interval must not be negative".to_string());
        }
        if let Some(exit) = self.date_of_exit {
            if exit < self.date_of_entry {
                return Err("date_of_exit must not precede date_of_entry".to_string());
            }
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}
