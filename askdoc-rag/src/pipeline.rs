//! RAG pipeline orchestrator.
//!
//! The [`RagPipeline`] coordinates the provision → ingest → answer workflow
//! by composing an [`EmbeddingProvider`], a [`VectorStore`], a [`Chunker`],
//! a [`PromptStrategy`], and an [`AnswerGenerator`]. It is an explicitly
//! constructed, injected handle: callers build one at startup and share it,
//! rather than relying on module-level singleton state.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use askdoc_rag::{RagPipeline, RagConfig, InMemoryVectorStore, FixedSizeChunker, StuffedContextPrompt};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .chunker(Arc::new(FixedSizeChunker::new(100, 0)))
//!     .prompt_strategy(Arc::new(StuffedContextPrompt))
//!     .generator(Arc::new(my_generator))
//!     .build()?;
//!
//! pipeline.provision("docs").await?;
//! let report = pipeline.ingest("docs", &document).await?;
//! let answer = pipeline.answer("docs", "What is this about?").await?;
//! ```

use std::sync::Arc;

use tracing::{error, info};

use crate::chunking::Chunker;
use crate::config::RagConfig;
use crate::document::{Answer, Chunk, Document, IngestReport, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::{AnswerGenerator, PromptStrategy};
use crate::vectorstore::{DistanceMetric, VectorStore};

/// The RAG pipeline orchestrator.
///
/// Coordinates index provisioning (create-if-absent), document ingestion
/// (chunk → embed → batched upsert), and question answering (embed → search
/// → prompt → generate). Construct one via [`RagPipeline::builder()`].
///
/// Every failure propagates as a [`RagError`]; nothing is logged-and-swallowed.
pub struct RagPipeline {
    config: RagConfig,
    metric: DistanceMetric,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    chunker: Arc<dyn Chunker>,
    prompt_strategy: Arc<dyn PromptStrategy>,
    generator: Arc<dyn AnswerGenerator>,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Ensure the named index exists in the vector store.
    ///
    /// The index is created with the dimensionality reported by the
    /// configured [`EmbeddingProvider`] and the pipeline's distance metric.
    /// When the index already exists this is a no-op: the backend sees a
    /// listing call but no create call.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`RagError`] if listing or creation fails.
    /// Callers can therefore distinguish "index ready" from "provisioning
    /// failed".
    pub async fn provision(&self, index: &str) -> Result<()> {
        let dimensions = self.embedding_provider.dimensions();
        self.vector_store.ensure_collection(index, dimensions, self.metric).await.map_err(|e| {
            error!(index, error = %e, "failed to provision index");
            e
        })?;
        info!(index, dimensions, "index provisioned");
        Ok(())
    }

    /// Ingest a single document: chunk → embed → batched upsert.
    ///
    /// The whole document is embedded in one batched provider call; the
    /// resulting records are upserted in batches of at most
    /// `upsert_batch_size`, with the final partial batch flushed even when
    /// smaller. Record ids follow the `{document_id}_{chunk_index}` scheme,
    /// so re-ingesting the same document overwrites rather than duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::PartialIngest`] if an upsert batch fails after
    /// earlier batches were written; already-written batches are not rolled
    /// back. Embedding failures propagate before any write happens.
    pub async fn ingest(&self, index: &str, document: &Document) -> Result<IngestReport> {
        let mut chunks = self.chunker.chunk(document);
        if chunks.is_empty() {
            info!(document.id = %document.id, chunk_count = 0, "ingested document (empty)");
            return Ok(IngestReport {
                document_id: document.id.clone(),
                chunk_count: 0,
                batch_count: 0,
            });
        }

        // One batched embedding call for the whole document. Newlines are
        // flattened to spaces before embedding.
        let texts: Vec<String> = chunks.iter().map(|c| c.text.replace('\n', " ")).collect();
        let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();

        let embeddings = self.embedding_provider.embed_batch(&text_refs).await.map_err(|e| {
            error!(document.id = %document.id, error = %e, "embedding failed during ingestion");
            e
        })?;

        if embeddings.len() != chunks.len() {
            return Err(RagError::PipelineError(format!(
                "embedding count mismatch for document '{}': {} chunks, {} embeddings",
                document.id,
                chunks.len(),
                embeddings.len()
            )));
        }

        // Positional correspondence: embedding i belongs to chunk i.
        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }

        let batch_size = self.config.upsert_batch_size;
        let batches: Vec<&[Chunk]> = chunks.chunks(batch_size).collect();
        let batches_total = batches.len();

        for (batch_index, batch) in batches.into_iter().enumerate() {
            if let Err(e) = self.vector_store.upsert(index, batch).await {
                error!(
                    document.id = %document.id,
                    batch_index,
                    batches_total,
                    error = %e,
                    "upsert failed during ingestion"
                );
                return Err(RagError::PartialIngest {
                    document_id: document.id.clone(),
                    batches_done: batch_index,
                    batches_total,
                    message: e.to_string(),
                });
            }
        }

        let report = IngestReport {
            document_id: document.id.clone(),
            chunk_count: chunks.len(),
            batch_count: batches_total,
        };
        info!(
            document.id = %document.id,
            chunk_count = report.chunk_count,
            batch_count = report.batch_count,
            "ingested document"
        );
        Ok(report)
    }

    /// Retrieve the most similar stored chunks for a question.
    ///
    /// Embeds the question with the same provider used at ingestion, runs a
    /// top-K search, and filters by the configured similarity threshold.
    /// Results are ordered by descending score. Under the Euclidean metric
    /// scores are negated distances, so the similarity threshold does not
    /// apply and all top-K results pass through.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`RagError`] if embedding or search fails.
    pub async fn retrieve(&self, index: &str, question: &str) -> Result<Vec<SearchResult>> {
        let query_embedding = self.embedding_provider.embed(question).await.map_err(|e| {
            error!(error = %e, "embedding failed during query");
            e
        })?;

        let results = self
            .vector_store
            .search(index, &query_embedding, self.config.top_k)
            .await
            .map_err(|e| {
                error!(index, error = %e, "vector store search failed");
                e
            })?;

        // A similarity cutoff has no meaning for negated-distance scores.
        let threshold = self.config.similarity_threshold;
        let filtered: Vec<SearchResult> = match self.metric {
            DistanceMetric::Euclid => results,
            DistanceMetric::Cosine | DistanceMetric::Dot => {
                results.into_iter().filter(|r| r.score >= threshold).collect()
            }
        };

        info!(result_count = filtered.len(), "retrieval completed");
        Ok(filtered)
    }

    /// Answer a question grounded in the indexed content.
    ///
    /// Retrieves context, stuffs it into the configured prompt strategy, and
    /// invokes the generator. When retrieval yields zero matches the
    /// generator is **not** invoked and `Ok(None)` is returned: an absent
    /// answer is a valid empty result, distinct from an `Err`.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`RagError`] if embedding, search, or
    /// generation fails.
    pub async fn answer(&self, index: &str, question: &str) -> Result<Option<Answer>> {
        let results = self.retrieve(index, question).await?;
        if results.is_empty() {
            info!(index, "no matches for question, skipping generation");
            return Ok(None);
        }

        let contexts: Vec<&str> = results.iter().map(|r| r.chunk.text.as_str()).collect();
        let prompt = self.prompt_strategy.render(question, &contexts);

        let text = self.generator.generate(&prompt).await.map_err(|e| {
            error!(model = self.generator.model_name(), error = %e, "generation failed");
            e
        })?;

        info!(
            model = self.generator.model_name(),
            context_chunks = contexts.len(),
            "generated answer"
        );
        Ok(Some(Answer { text, context_chunks: contexts.len() }))
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// All component fields are required; `metric` defaults to cosine. Call
/// [`build()`](RagPipelineBuilder::build) to validate and produce the pipeline.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    metric: DistanceMetric,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    chunker: Option<Arc<dyn Chunker>>,
    prompt_strategy: Option<Arc<dyn PromptStrategy>>,
    generator: Option<Arc<dyn AnswerGenerator>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the similarity metric used when provisioning the index.
    pub fn metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the prompt strategy used to stuff retrieved context.
    pub fn prompt_strategy(mut self, strategy: Arc<dyn PromptStrategy>) -> Self {
        self.prompt_strategy = Some(strategy);
        self
    }

    /// Set the answer generator.
    pub fn generator(mut self, generator: Arc<dyn AnswerGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required field is missing.
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::ConfigError("config is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::ConfigError("vector_store is required".to_string()))?;
        let chunker =
            self.chunker.ok_or_else(|| RagError::ConfigError("chunker is required".to_string()))?;
        let prompt_strategy = self
            .prompt_strategy
            .ok_or_else(|| RagError::ConfigError("prompt_strategy is required".to_string()))?;
        let generator = self
            .generator
            .ok_or_else(|| RagError::ConfigError("generator is required".to_string()))?;

        Ok(RagPipeline {
            config,
            metric: self.metric,
            embedding_provider,
            vector_store,
            chunker,
            prompt_strategy,
            generator,
        })
    }
}
