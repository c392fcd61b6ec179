//! Server error type and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the HTTP layer.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The request was malformed (empty question, bad body).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A pipeline operation against an external service failed.
    #[error(transparent)]
    Pipeline(#[from] askdoc_rag::RagError),

    /// Invalid or missing server configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Pipeline(_) => StatusCode::BAD_GATEWAY,
            ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// A convenience result type for handlers.
pub type Result<T> = std::result::Result<T, ServerError>;
