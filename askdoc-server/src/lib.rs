//! HTTP server for the askdoc document question-answering service.
//!
//! Wires an [`askdoc_rag::RagPipeline`] behind two endpoints:
//! `POST /api/setup` (provision + ingest the configured document) and
//! `POST /api/query` (answer a question grounded in the index).

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use routes::{app, DataResponse};
pub use state::AppState;

use std::sync::Arc;

use askdoc_rag::{
    FixedSizeChunker, OpenAiChatGenerator, OpenAiEmbeddingProvider, QdrantVectorStore, RagConfig,
    RagPipeline, StuffedContextPrompt,
};

/// Build the production pipeline from the server configuration.
///
/// OpenAI embeddings + chat, a Qdrant store, and the fixed 100/0 splitting
/// policy with stuffed-context prompting.
pub fn build_pipeline(config: &ServerConfig) -> Result<RagPipeline> {
    let store = match &config.qdrant_api_key {
        Some(key) => QdrantVectorStore::with_api_key(&config.qdrant_url, key)?,
        None => QdrantVectorStore::new(&config.qdrant_url)?,
    };

    let rag_config = RagConfig::default();
    let chunker = FixedSizeChunker::new(rag_config.chunk_size, rag_config.chunk_overlap);

    let pipeline = RagPipeline::builder()
        .config(rag_config)
        .embedding_provider(Arc::new(OpenAiEmbeddingProvider::new(config.openai_api_key.as_str())?))
        .vector_store(Arc::new(store))
        .chunker(Arc::new(chunker))
        .prompt_strategy(Arc::new(StuffedContextPrompt))
        .generator(Arc::new(OpenAiChatGenerator::new(config.openai_api_key.as_str())?))
        .build()?;

    Ok(pipeline)
}

/// Build the shared state from configuration.
pub fn build_state(config: ServerConfig) -> Result<Arc<AppState>> {
    let pipeline = build_pipeline(&config)?;
    Ok(Arc::new(AppState {
        pipeline,
        index: config.index,
        document_path: config.document_path,
        strict_errors: config.strict_errors,
    }))
}
