use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::letters::{PdfConverter, TemplateFileStore};
use crate::rate_limit::LoginRateLimiter;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub pdf: Arc<dyn PdfConverter>,
    pub template_file: TemplateFileStore,
    pub login_limiter: LoginRateLimiter,
}
