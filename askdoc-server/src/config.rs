//! Environment-driven server configuration.

use std::env;
use std::path::PathBuf;

use crate::error::{Result, ServerError};

/// Configuration for the askdoc server, read from process environment
/// variables (a `.env` file is honored via `dotenvy` in `main`).
///
/// | Variable               | Default                  |
/// |------------------------|--------------------------|
/// | `OPENAI_API_KEY`       | required                 |
/// | `QDRANT_URL`           | `http://localhost:6334`  |
/// | `QDRANT_API_KEY`       | none                     |
/// | `ASKDOC_INDEX`         | `test-index-01`          |
/// | `ASKDOC_DOCUMENT`      | `documents/sample.pdf`   |
/// | `ASKDOC_ADDR`          | `0.0.0.0:3000`           |
/// | `ASKDOC_STRICT_ERRORS` | `true`                   |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// API key for the embedding/LLM provider.
    pub openai_api_key: String,
    /// Qdrant gRPC endpoint.
    pub qdrant_url: String,
    /// Optional API key for hosted Qdrant clusters.
    pub qdrant_api_key: Option<String>,
    /// Name of the vector index used for ingestion and queries.
    pub index: String,
    /// Path of the document ingested by `/api/setup`.
    pub document_path: PathBuf,
    /// Socket address the server binds to.
    pub addr: String,
    /// Whether `/api/setup` surfaces pipeline failures as HTTP errors.
    ///
    /// When false the endpoint reports success unconditionally and only
    /// logs failures, reproducing the original demo behavior.
    pub strict_errors: bool,
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

impl ServerConfig {
    /// Load the configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] when `OPENAI_API_KEY` is missing or
    /// `ASKDOC_STRICT_ERRORS` is not a boolean.
    pub fn from_env() -> Result<Self> {
        let openai_api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| ServerError::Config("OPENAI_API_KEY is not set".to_string()))?;

        let strict_raw = env_or("ASKDOC_STRICT_ERRORS", "true");
        let strict_errors = strict_raw.parse::<bool>().map_err(|_| {
            ServerError::Config(format!(
                "ASKDOC_STRICT_ERRORS must be 'true' or 'false', got '{strict_raw}'"
            ))
        })?;

        Ok(Self {
            openai_api_key,
            qdrant_url: env_or("QDRANT_URL", "http://localhost:6334"),
            qdrant_api_key: env::var("QDRANT_API_KEY").ok(),
            index: env_or("ASKDOC_INDEX", "test-index-01"),
            document_path: PathBuf::from(env_or("ASKDOC_DOCUMENT", "documents/sample.pdf")),
            addr: env_or("ASKDOC_ADDR", "0.0.0.0:3000"),
            strict_errors,
        })
    }
}
