//! Router tests: response envelopes, strict vs lenient setup errors, and
//! the null-data-on-no-matches contract.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use askdoc_rag::{
    AnswerGenerator, EmbeddingProvider, FixedSizeChunker, InMemoryVectorStore, RagConfig,
    RagPipeline, Result as RagResult, StuffedContextPrompt,
};
use askdoc_server::{app, AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::util::ServiceExt;

struct MockEmbeddingProvider;

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut emb = vec![0.0f32; 16];
        for (i, v) in emb.iter_mut().enumerate() {
            // Strictly positive components keep cosine scores above the
            // default 0.0 threshold.
            *v = 1.0 + ((hash.wrapping_add(i as u64)) as f32).sin() * 0.5;
        }
        let norm: f32 = emb.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            emb.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(emb)
    }

    fn dimensions(&self) -> usize {
        16
    }
}

struct FixedGenerator;

#[async_trait]
impl AnswerGenerator for FixedGenerator {
    async fn generate(&self, _prompt: &str) -> RagResult<String> {
        Ok("The document is about testing.".to_string())
    }

    fn model_name(&self) -> &str {
        "fixed"
    }
}

fn test_app(document_path: PathBuf, strict_errors: bool) -> Router {
    let pipeline = RagPipeline::builder()
        .config(RagConfig::default())
        .embedding_provider(Arc::new(MockEmbeddingProvider))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .chunker(Arc::new(FixedSizeChunker::new(100, 0)))
        .prompt_strategy(Arc::new(StuffedContextPrompt))
        .generator(Arc::new(FixedGenerator))
        .build()
        .unwrap();

    app(Arc::new(AppState {
        pipeline,
        index: "test-index-01".to_string(),
        document_path,
        strict_errors,
    }))
}

fn sample_document() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    write!(file, "This service exists to demonstrate retrieval-augmented generation over a document.")
        .unwrap();
    file
}

async fn post_json(router: Router, uri: &str, body: Body) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

#[tokio::test]
async fn setup_then_query_returns_answer() {
    let file = sample_document();
    let router = test_app(file.path().to_path_buf(), true);

    let (status, body) = post_json(router.clone(), "/api/setup", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    let message = body["data"].as_str().unwrap();
    assert!(message.contains("test-index-01"), "unexpected setup message: {message}");

    let question = serde_json::json!("What is this document about?").to_string();
    let (status, body) = post_json(router, "/api/query", Body::from(question)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], "The document is about testing.");
}

#[tokio::test]
async fn query_against_empty_index_returns_null_data() {
    // An empty document provisions the index but stores no chunks.
    let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    let router = test_app(file.path().to_path_buf(), true);

    let (status, _) = post_json(router.clone(), "/api/setup", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);

    // No matches: the generator is not invoked and data is null.
    let question = serde_json::json!("What is this document about?").to_string();
    let (status, body) = post_json(router, "/api/query", Body::from(question)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn empty_question_is_a_bad_request() {
    let file = sample_document();
    let router = test_app(file.path().to_path_buf(), true);

    let question = serde_json::json!("   ").to_string();
    let (status, body) = post_json(router, "/api/query", Body::from(question)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("question"));
}

#[tokio::test]
async fn strict_setup_surfaces_load_failure() {
    let router = test_app(PathBuf::from("does/not/exist.txt"), true);

    let (status, body) = post_json(router, "/api/setup", Body::empty()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("does/not/exist.txt"));
}

#[tokio::test]
async fn lenient_setup_reports_success_on_failure() {
    let router = test_app(PathBuf::from("does/not/exist.txt"), false);

    let (status, body) = post_json(router, "/api/setup", Body::empty()).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_str().unwrap().contains("successfully"));
}
