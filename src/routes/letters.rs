use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extractor::AuthAccount;
use crate::db;
use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::letters::{employee_fields, fill_html, render_html, render_pdf};
use crate::middleware::audit;
use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
pub struct LetterQuery {
    /// Use a stored template instead of the template file.
    pub template_id: Option<Uuid>,
}

/// Fill the cover letter for one employee and wrap it as an HTML document.
async fn letter_html(
    state: &SharedState,
    employee_id: Uuid,
    query: &LetterQuery,
) -> Result<(String, String), AppError> {
    let employee = db::employees::find_by_id(&state.pool, employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;
    let department = db::departments::find_by_id(&state.pool, employee.department_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Department not found".to_string()))?;

    let body = match query.template_id {
        Some(id) => {
            db::templates::find_by_id(&state.pool, id)
                .await?
                .ok_or_else(|| AppError::NotFound("Template not found".to_string()))?
                .body
        }
        None => state.template_file.read().await?,
    };

    let fields = employee_fields(&employee, &department, Utc::now().date_naive());
    let filled = fill_html(&body, &fields)?;
    let title = format!("Einladung {}", employee.full_name());
    let html = render_html(&title, &filled)?;
    Ok((html, employee.employee_id))
}

pub async fn html(
    _auth: AuthAccount,
    State(state): State<SharedState>,
    Path(employee_id): Path<Uuid>,
    Query(query): Query<LetterQuery>,
) -> Result<Html<String>, AppError> {
    let (html, _) = letter_html(&state, employee_id, &query).await?;
    Ok(Html(html))
}

pub async fn pdf(
    auth: AuthAccount,
    State(state): State<SharedState>,
    Path(employee_id): Path<Uuid>,
    Query(query): Query<LetterQuery>,
) -> Result<Response, AppError> {
    let (html, personnel_number) = letter_html(&state, employee_id, &query).await?;
    let pdf = render_pdf(state.pdf.as_ref(), &html).await?;

    tracing::info!(employee = %employee_id, bytes = pdf.len(), "cover letter rendered as pdf");
    audit::log_event(
        &state.pool,
        Some(auth.account_id),
        "letter.generated",
        "employee",
        Some(employee_id),
        None,
    )
    .await;

    let disposition = format!("inline; filename=\"cover_letter_{personnel_number}.pdf\"");
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    )
        .into_response())
}

/// The raw template file.
pub async fn get_template(
    _auth: AuthAccount,
    State(state): State<SharedState>,
) -> Result<Html<String>, AppError> {
    let text = state.template_file.read().await?;
    Ok(Html(text))
}

/// Overwrite the template file with the request body.
pub async fn put_template(
    auth: AuthAccount,
    State(state): State<SharedState>,
    body: String,
) -> Result<Json<serde_json::Value>, AppError> {
    if body.trim().is_empty() {
        return Err(AppError::Validation("Template must not be empty".to_string()));
    }
    state.template_file.write(&body).await?;

    audit::log_event(
        &state.pool,
        Some(auth.account_id),
        "letter_template.updated",
        "letter_template",
        None,
        Some(serde_json::json!({ "bytes": body.len() })),
    )
    .await;

    Ok(Json(serde_json::json!({ "message": "Template saved" })))
}
