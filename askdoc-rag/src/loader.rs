//! Source document loading.
//!
//! Turns a local file into a [`Document`] whose id is the file path, so the
//! derived chunk ids stay stable across re-ingestion of the same file.

use std::path::Path;

use tracing::info;

use crate::document::Document;
use crate::error::{RagError, Result};

/// Load a PDF file and extract its text content.
///
/// The document id and `source` metadata field are the path as given.
pub fn load_pdf(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let path_str = path.display().to_string();

    let text = pdf_extract::extract_text(path).map_err(|e| RagError::LoaderError {
        path: path_str.clone(),
        message: format!("failed to extract PDF text: {e}"),
    })?;

    info!(path = %path_str, text_len = text.len(), "loaded PDF document");
    Ok(document_from(path_str, text))
}

/// Load a plain-text file.
pub fn load_text(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let path_str = path.display().to_string();

    let text = std::fs::read_to_string(path).map_err(|e| RagError::LoaderError {
        path: path_str.clone(),
        message: format!("failed to read file: {e}"),
    })?;

    info!(path = %path_str, text_len = text.len(), "loaded text document");
    Ok(document_from(path_str, text))
}

/// Load a document, dispatching on the file extension.
///
/// `.pdf` files go through the PDF extractor; anything else is read as
/// plain text.
pub fn load_document(path: impl AsRef<Path>) -> Result<Document> {
    let is_pdf = path
        .as_ref()
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if is_pdf {
        load_pdf(path)
    } else {
        load_text(path)
    }
}

fn document_from(path: String, text: String) -> Document {
    let mut document = Document::new(path.clone(), text);
    document.metadata.insert("source".to_string(), path.clone());
    document.source_uri = Some(path);
    document
}
