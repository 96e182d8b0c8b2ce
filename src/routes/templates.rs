use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::extractor::AuthAccount;
use crate::db;
use crate::error::AppError;
use crate::extract::{Json, Path};
use crate::letters::{employee_fields, fill};
use crate::middleware::audit;
use crate::models::LetterTemplate;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct TemplateInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub body: String,
}

impl TemplateInput {
    fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("name is required".to_string()));
        }
        Ok(())
    }
}

#[derive(Serialize)]
pub struct FilledTemplate {
    pub name: String,
    pub template_body: String,
}

pub async fn list(
    _auth: AuthAccount,
    State(state): State<SharedState>,
) -> Result<Json<Vec<LetterTemplate>>, AppError> {
    let templates = db::templates::list(&state.pool).await?;
    Ok(Json(templates))
}

pub async fn create(
    auth: AuthAccount,
    State(state): State<SharedState>,
    Json(req): Json<TemplateInput>,
) -> Result<(StatusCode, Json<LetterTemplate>), AppError> {
    req.validate()?;

    let template =
        db::templates::create(&state.pool, req.name.trim(), &req.description, &req.body).await?;

    audit::log_event(
        &state.pool,
        Some(auth.account_id),
        "template.created",
        "template",
        Some(template.id),
        None,
    )
    .await;

    Ok((StatusCode::CREATED, Json(template)))
}

pub async fn get(
    _auth: AuthAccount,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LetterTemplate>, AppError> {
    let template = db::templates::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Template not found".to_string()))?;
    Ok(Json(template))
}

pub async fn update(
    auth: AuthAccount,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TemplateInput>,
) -> Result<Json<LetterTemplate>, AppError> {
    req.validate()?;

    let template =
        db::templates::update(&state.pool, id, req.name.trim(), &req.description, &req.body)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => AppError::NotFound("Template not found".to_string()),
                _ => AppError::from(e),
            })?;

    audit::log_event(
        &state.pool,
        Some(auth.account_id),
        "template.updated",
        "template",
        Some(id),
        None,
    )
    .await;

    Ok(Json(template))
}

pub async fn delete(
    auth: AuthAccount,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    if db::templates::delete(&state.pool, id).await? == 0 {
        return Err(AppError::NotFound("Template not found".to_string()));
    }

    audit::log_event(
        &state.pool,
        Some(auth.account_id),
        "template.deleted",
        "template",
        Some(id),
        None,
    )
    .await;

    Ok(Json(serde_json::json!({ "message": "Deleted" })))
}

/// The template body with the employee's fields substituted.
pub async fn fill_for_employee(
    _auth: AuthAccount,
    State(state): State<SharedState>,
    Path((id, employee_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<FilledTemplate>, AppError> {
    let template = db::templates::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Template not found".to_string()))?;
    let employee = db::employees::find_by_id(&state.pool, employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;
    let department = db::departments::find_by_id(&state.pool, employee.department_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Department not found".to_string()))?;

    let fields = employee_fields(&employee, &department, Utc::now().date_naive());
    let template_body = fill(&template.body, &fields)?;

    Ok(Json(FilledTemplate {
        name: template.name,
        template_body,
    }))
}
