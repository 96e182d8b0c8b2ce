use askama::Template;

use super::{LetterError, PdfConverter};

#[derive(Template)]
#[template(path = "letters/letter.html")]
struct LetterDocument<'a> {
    title: &'a str,
    body: &'a str,
}

/// Wrap a filled letter body in a printable HTML document.
///
/// Bodies that already are complete documents are passed through unchanged.
pub fn render_html(title: &str, filled_body: &str) -> Result<String, LetterError> {
    if is_full_document(filled_body) {
        return Ok(filled_body.to_string());
    }

    LetterDocument {
        title,
        body: filled_body,
    }
    .render()
    .map_err(|e| LetterError::Html(e.to_string()))
}

/// Convert rendered HTML to PDF. Either the complete document is returned or an error.
pub async fn render_pdf(converter: &dyn PdfConverter, html: &str) -> Result<Vec<u8>, LetterError> {
    let pdf = converter.convert(html).await?;
    if !pdf.starts_with(b"%PDF") {
        return Err(LetterError::PdfRender(format!(
            "converter produced {} bytes without a PDF header",
            pdf.len()
        )));
    }
    Ok(pdf)
}

fn is_full_document(body: &str) -> bool {
    let head = body.trim_start();
    let head = head.get(..16).unwrap_or(head).to_ascii_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html")
}
