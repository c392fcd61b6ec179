//! Property tests for in-memory vector store search ordering and upsert
//! semantics.

use std::collections::HashMap;

use askdoc_rag::document::Chunk;
use askdoc_rag::inmemory::InMemoryVectorStore;
use askdoc_rag::vectorstore::{DistanceMetric, VectorStore};
use proptest::prelude::*;

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map("non-zero embedding", |mut v| {
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm < 1e-8 {
            return None;
        }
        for val in &mut v {
            *val /= norm;
        }
        Some(v)
    })
}

/// Generate a chunk with a normalized embedding.
fn arb_chunk(dim: usize) -> impl Strategy<Value = Chunk> {
    ("[a-z]{3,8}", "[a-z ]{5,30}", arb_normalized_embedding(dim)).prop_map(
        |(id, text, embedding)| Chunk {
            id,
            text,
            embedding,
            metadata: HashMap::new(),
            document_id: "doc_1".to_string(),
        },
    )
}

const DIM: usize = 16;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Search returns results ordered by descending similarity score, and
    /// never more than `top_k` of them.
    #[test]
    fn results_ordered_descending_and_bounded_by_top_k(
        chunks in proptest::collection::vec(arb_chunk(DIM), 1..20),
        query in arb_normalized_embedding(DIM),
        top_k in 1usize..25,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (results, unique_count) = rt.block_on(async {
            let store = InMemoryVectorStore::new();
            store.ensure_collection("test", DIM, DistanceMetric::Cosine).await.unwrap();

            // Deduplicate chunks by id to avoid upsert overwriting
            let mut deduped: HashMap<String, Chunk> = HashMap::new();
            for chunk in &chunks {
                deduped.entry(chunk.id.clone()).or_insert_with(|| chunk.clone());
            }
            let unique_chunks: Vec<Chunk> = deduped.into_values().collect();
            let count = unique_chunks.len();

            store.upsert("test", &unique_chunks).await.unwrap();
            let results = store.search("test", &query, top_k).await.unwrap();
            (results, count)
        });

        prop_assert!(results.len() <= top_k);
        prop_assert!(results.len() <= unique_count);

        for window in results.windows(2) {
            prop_assert!(
                window[0].score >= window[1].score,
                "results not in descending order: {} < {}",
                window[0].score,
                window[1].score,
            );
        }
    }

    /// Upserting the same ids again leaves the collection size unchanged.
    #[test]
    fn upsert_by_id_is_idempotent(
        chunks in proptest::collection::vec(arb_chunk(DIM), 1..20),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (after_first, after_second) = rt.block_on(async {
            let store = InMemoryVectorStore::new();
            store.ensure_collection("test", DIM, DistanceMetric::Cosine).await.unwrap();

            store.upsert("test", &chunks).await.unwrap();
            let first = store.len("test").await.unwrap();
            store.upsert("test", &chunks).await.unwrap();
            let second = store.len("test").await.unwrap();
            (first, second)
        });

        prop_assert_eq!(after_first, after_second);
    }
}

#[tokio::test]
async fn search_on_missing_collection_is_an_error() {
    let store = InMemoryVectorStore::new();
    assert!(store.search("absent", &[0.0; DIM], 5).await.is_err());
}

#[tokio::test]
async fn euclid_metric_ranks_nearest_first() {
    let store = InMemoryVectorStore::new();
    store.ensure_collection("e", 2, DistanceMetric::Euclid).await.unwrap();

    let chunk = |id: &str, v: Vec<f32>| Chunk {
        id: id.into(),
        text: id.into(),
        embedding: v,
        metadata: HashMap::new(),
        document_id: "d".into(),
    };
    store
        .upsert("e", &[chunk("near", vec![1.0, 0.0]), chunk("far", vec![5.0, 5.0])])
        .await
        .unwrap();

    let results = store.search("e", &[1.0, 0.1], 2).await.unwrap();
    assert_eq!(results[0].chunk.id, "near");
}
