//! Vector store trait for storing and searching vector embeddings.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::{Chunk, SearchResult};
use crate::error::Result;

/// The similarity metric a collection is provisioned with.
///
/// Must match the metric the embedding model was trained for; the service
/// defaults to cosine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Cosine similarity (angle between vectors).
    #[default]
    Cosine,
    /// Dot-product similarity.
    Dot,
    /// Euclidean distance (lower is closer; backends convert to a
    /// higher-is-better score).
    Euclid,
}

/// A storage backend for vector embeddings with similarity search.
///
/// Implementations manage named collections of [`Chunk`]s keyed by chunk id
/// and support upserting and searching by vector similarity. Upsert is by
/// id: writing a chunk whose id already exists overwrites the prior record.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Ensure a named collection exists (create-if-absent).
    ///
    /// Lists existing collections first; when the collection is already
    /// present this is a no-op and the backend sees no create call.
    /// Creation on a remote backend may be asynchronous; readiness is not
    /// guaranteed on return.
    async fn ensure_collection(
        &self,
        name: &str,
        dimensions: usize,
        metric: DistanceMetric,
    ) -> Result<()>;

    /// Delete a named collection and all its data.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Upsert chunks into a collection. Chunks must have embeddings set.
    async fn upsert(&self, collection: &str, chunks: &[Chunk]) -> Result<()>;

    /// Search for the `top_k` most similar chunks to the given embedding.
    ///
    /// Returns results ordered by descending score. Scores are
    /// higher-is-better under every metric: Euclidean backends report the
    /// negated distance, never the raw distance.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>>;
}
