//! Retrieval-augmented generation pipeline for the askdoc service.
//!
//! This crate orchestrates three external collaborators — a document loader,
//! a vector database, and an embedding/LLM provider — into a linear
//! provision → ingest → answer workflow:
//!
//! - **Provision**: ensure a named vector index exists (create-if-absent)
//!   with the embedding model's dimensionality and a similarity metric.
//! - **Ingest**: split a document into chunks, embed all chunks in one
//!   batched call, and upsert the records in fixed-size batches.
//! - **Answer**: embed a question, retrieve the top-K most similar chunks,
//!   stuff their text into a prompt, and ask an LLM for a grounded answer.
//!
//! Components are trait objects injected through [`RagPipeline::builder()`],
//! so stores ([`QdrantVectorStore`], [`InMemoryVectorStore`]), embedding
//! backends, and prompt strategies swap freely.

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod inmemory;
pub mod loader;
pub mod openai;
pub mod pipeline;
pub mod qdrant;
pub mod vectorstore;

pub use chunking::{Chunker, FixedSizeChunker, RecursiveChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Answer, Chunk, Document, IngestReport, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use generation::{
    AnswerGenerator, PromptStrategy, QaChainPrompt, StuffedContextPrompt, FALLBACK_ANSWER,
};
pub use inmemory::InMemoryVectorStore;
pub use loader::{load_document, load_pdf, load_text};
pub use openai::{OpenAiChatGenerator, OpenAiEmbeddingProvider};
pub use pipeline::{RagPipeline, RagPipelineBuilder};
pub use qdrant::QdrantVectorStore;
pub use vectorstore::{DistanceMetric, VectorStore};
