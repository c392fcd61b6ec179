//! Error types for the `askdoc-rag` crate.

use thiserror::Error;

/// Errors that can occur in RAG operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred while generating an answer with the LLM.
    #[error("Generation error ({model}): {message}")]
    GenerationError {
        /// The model that produced the error.
        model: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred while loading a source document.
    #[error("Loader error ({path}): {message}")]
    LoaderError {
        /// The path of the document that failed to load.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// Ingestion stopped partway through upserting batches.
    ///
    /// Batches `0..batches_done` were written to the vector store and are
    /// not rolled back; the remaining batches were never attempted.
    #[error(
        "Partial ingestion of '{document_id}': {batches_done}/{batches_total} batches upserted: {message}"
    )]
    PartialIngest {
        /// The document whose ingestion was interrupted.
        document_id: String,
        /// Number of batches successfully upserted before the failure.
        batches_done: usize,
        /// Total number of batches the ingestion would have issued.
        batches_total: usize,
        /// A description of the underlying failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An error in the RAG pipeline orchestration.
    #[error("Pipeline error: {0}")]
    PipelineError(String),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
