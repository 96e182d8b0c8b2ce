pub mod auth;
pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod extract;
pub mod letters;
pub mod middleware;
pub mod mock;
pub mod models;
pub mod rate_limit;
pub mod reminder;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::Router;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::letters::{CommandPdfConverter, PdfConverter, TemplateFileStore};
use crate::rate_limit::{spawn_cleanup, LoginRateLimiter};
use crate::state::{AppState, SharedState};

/// Build the application with the configured external PDF converter.
pub fn build_app(pool: PgPool, config: Config) -> Result<Router, String> {
    let converter = CommandPdfConverter::from_config(&config.letters)?;
    Ok(build_app_with(pool, config, Arc::new(converter)))
}

/// Must be called from within a Tokio runtime.
pub fn build_app_with(pool: PgPool, config: Config, pdf: Arc<dyn PdfConverter>) -> Router {
    let cors = cors_layer(&config.cors_origins);
    let max_body_size = config.max_body_size;

    let state: SharedState = Arc::new(AppState {
        pool,
        template_file: TemplateFileStore::new(config.letters.template_path.clone()),
        config,
        pdf,
        login_limiter: LoginRateLimiter::new(),
    });
    spawn_cleanup(Arc::downgrade(&state));

    let layers = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_size));

    let mut app = Router::new()
        .merge(routes::api_routes())
        .route("/health", axum::routing::get(health))
        .layer(layers)
        .with_state(state);

    if let Some(cors) = cors {
        app = app.layer(cors);
    }
    app
}

/// No CORS headers unless origins are configured.
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {o:?}");
                None
            }
        })
        .collect();
    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true),
    )
}

async fn health() -> &'static str {
    "ok"
}
