//! Shared application state.

use std::path::PathBuf;

use askdoc_rag::RagPipeline;

/// State shared across request handlers.
///
/// The pipeline is constructed once at startup and injected here; handlers
/// never reach for global state.
pub struct AppState {
    /// The RAG pipeline handle.
    pub pipeline: RagPipeline,
    /// Name of the vector index.
    pub index: String,
    /// Path of the document ingested by the setup endpoint.
    pub document_path: PathBuf,
    /// Whether setup failures surface as HTTP errors.
    pub strict_errors: bool,
}
