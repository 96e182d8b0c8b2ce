use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Value};

use super::LetterError;
use crate::dates;
use crate::models::{Department, Employee};

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*(\w+(?:\.\w+)*)\s*\}\}").unwrap());

/// Replace every `{{field}}` placeholder with its value from `fields`.
///
/// Dotted paths walk nested objects. A placeholder whose value is missing,
/// null or not a scalar fails the whole fill.
pub fn fill(body: &str, fields: &Map<String, Value>) -> Result<String, LetterError> {
    fill_with(body, fields, str::to_string)
}

/// Like [`fill`], but HTML-escapes substituted values. The template body itself
/// is trusted markup.
pub fn fill_html(body: &str, fields: &Map<String, Value>) -> Result<String, LetterError> {
    fill_with(body, fields, escape_html)
}

fn fill_with(
    body: &str,
    fields: &Map<String, Value>,
    encode: impl Fn(&str) -> String,
) -> Result<String, LetterError> {
    let mut out = String::with_capacity(body.len());
    let mut last = 0;

    for caps in PLACEHOLDER_RE.captures_iter(body) {
        let (Some(whole), Some(path)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value = resolve(path.as_str(), fields)
            .ok_or_else(|| LetterError::UnresolvedPlaceholder(path.as_str().to_string()))?;

        out.push_str(&body[last..whole.start()]);
        out.push_str(&encode(&value));
        last = whole.end();
    }

    out.push_str(&body[last..]);
    Ok(out)
}

fn resolve(path: &str, fields: &Map<String, Value>) -> Option<String> {
    let mut segments = path.split('.');
    let mut current = fields.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }

    match current {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Field mapping used to fill letters for one employee.
///
/// Employee attributes are available both flat (`{{last_name}}`) and under
/// `employee` (`{{employee.last_name}}`). Nullable attributes are present as
/// empty strings so templates may reference them.
pub fn employee_fields(
    employee: &Employee,
    department: &Department,
    today: NaiveDate,
) -> Map<String, Value> {
    let optional_date = |d: Option<NaiveDate>| Value::String(d.map(dates::format).unwrap_or_default());

    let mut person = Map::new();
    person.insert("id".into(), Value::String(employee.id.to_string()));
    person.insert("employee_id".into(), Value::String(employee.employee_id.clone()));
    person.insert("first_name".into(), Value::String(employee.first_name.clone()));
    person.insert("last_name".into(), Value::String(employee.last_name.clone()));
    person.insert("full_name".into(), Value::String(employee.full_name()));
    person.insert("gender".into(), Value::String(employee.gender.as_str().to_string()));
    person.insert("date_of_birth".into(), Value::String(dates::format(employee.date_of_birth)));
    person.insert("date_of_entry".into(), Value::String(dates::format(employee.date_of_entry)));
    person.insert("date_of_exit".into(), optional_date(employee.date_of_exit));
    person.insert("next_reminder".into(), optional_date(employee.next_reminder));
    person.insert("reminder_interval".into(), Value::from(employee.reminder_interval));
    person.insert("notes".into(), Value::String(employee.notes.clone()));
    person.insert("active".into(), Value::Bool(employee.active));
    person.insert("wants_reminder".into(), Value::Bool(employee.wants_reminder));
    person.insert("department_id".into(), Value::String(department.id.to_string()));

    let mut dept = Map::new();
    dept.insert("id".into(), Value::String(department.id.to_string()));
    dept.insert("name".into(), Value::String(department.name.clone()));
    dept.insert("reminder_interval".into(), Value::from(department.reminder_interval));

    let mut fields = person.clone();
    fields.insert("employee".into(), Value::Object(person));
    fields.insert("department".into(), Value::Object(dept));
    fields.insert("today".into(), Value::String(dates::format(today)));
    fields
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
