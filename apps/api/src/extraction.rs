//! Text extraction for uploaded résumés and job descriptions.
//!
//! PDF and DOCX parsing is CPU-bound; callers run `extract_text` inside
//! `tokio::task::spawn_blocking`.

use docx_rs::{DocumentChild, ParagraphChild, RunChild};
use thiserror::Error;

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type '{0}'. Upload a PDF, DOCX or plain-text file.")]
    Unsupported(String),

    #[error("No text could be extracted from the uploaded file")]
    Empty,

    #[error("Failed to read PDF: {0}")]
    Pdf(String),

    #[error("Failed to read DOCX: {0}")]
    Docx(String),

    #[error("Text file is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

/// Picks a decoder from the declared content type, then the file extension.
fn detect_kind(filename: &str, content_type: Option<&str>) -> Option<DocumentKind> {
    match content_type.map(|ct| ct.split(';').next().unwrap_or(ct).trim()) {
        Some("application/pdf") => return Some(DocumentKind::Pdf),
        Some(DOCX_CONTENT_TYPE) => return Some(DocumentKind::Docx),
        Some("text/plain") => return Some(DocumentKind::PlainText),
        _ => {}
    }

    let extension = filename.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("pdf") => Some(DocumentKind::Pdf),
        Some("docx") => Some(DocumentKind::Docx),
        Some("txt") => Some(DocumentKind::PlainText),
        _ => None,
    }
}

/// Extracts trimmed text from an uploaded file.
pub fn extract_text(
    filename: &str,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<String, ExtractionError> {
    let kind = detect_kind(filename, content_type).ok_or_else(|| {
        ExtractionError::Unsupported(
            content_type
                .map(str::to_string)
                .unwrap_or_else(|| filename.to_string()),
        )
    })?;

    let text = match kind {
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ExtractionError::Pdf(e.to_string()))?,
        DocumentKind::Docx => docx_text(bytes)?,
        DocumentKind::PlainText => String::from_utf8(bytes.to_vec())?,
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(ExtractionError::Empty);
    }
    Ok(text.to_string())
}

/// Body paragraphs, one per line. Tables, headers and footers are skipped.
fn docx_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| ExtractionError::Docx(e.to_string()))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(paragraph) => Some(paragraph),
            _ => None,
        })
        .map(|paragraph| {
            paragraph
                .children
                .iter()
                .filter_map(|child| match child {
                    ParagraphChild::Run(run) => Some(run),
                    _ => None,
                })
                .flat_map(|run| run.children.iter())
                .filter_map(|child| match child {
                    RunChild::Text(text) => Some(text.text.as_str()),
                    _ => None,
                })
                .collect::<String>()
        })
        .collect();

    Ok(paragraphs.join("\n"))
}
