use sqlx::PgPool;
use uuid::Uuid;

/// Record a mutation. Failures are logged and never fail the request.
pub async fn log_event(
    pool: &PgPool,
    account_id: Option<Uuid>,
    action: &str,
    resource_type: &str,
    resource_id: Option<Uuid>,
    details: Option<serde_json::Value>,
) {
    if let Err(e) = crate::db::audit::log_event(
        pool,
        account_id,
        action,
        resource_type,
        resource_id,
        details,
    )
    .await
    {
        tracing::error!("Failed to log audit event {action}: {e}");
    }
}
