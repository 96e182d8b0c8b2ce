pub mod pdf;
pub mod render;
pub mod store;
pub mod template;

pub use pdf::{CommandPdfConverter, PdfConverter};
pub use render::{render_html, render_pdf};
pub use store::TemplateFileStore;
pub use template::{employee_fields, fill, fill_html};

#[derive(Debug, thiserror::Error)]
pub enum LetterError {
    #[error("unresolved placeholder '{0}'")]
    UnresolvedPlaceholder(String),
    #[error("pdf conversion failed: {0}")]
    PdfRender(String),
    #[error("template file {0} does not exist")]
    TemplateMissing(String),
    #[error("html rendering failed: {0}")]
    Html(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
