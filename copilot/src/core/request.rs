//! Typed generation requests and client-input validation.

use serde_json::{Map, Value};
use thiserror::Error;

/// A validated request for generated text.
///
/// Built from wire payloads via `into_request()`; by construction the required
/// fields of each variant are non-empty.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationRequest {
    Template {
        project_type: String,
        artifact: String,
        /// Free-form requirements, rendered in insertion order.
        details: Map<String, Value>,
    },
    PrReview {
        diff: String,
        language: String,
    },
    Docs {
        repo_summary: String,
    },
    Chat {
        message: String,
    },
}

impl GenerationRequest {
    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationRequest::Template { .. } => "template",
            GenerationRequest::PrReview { .. } => "pr_review",
            GenerationRequest::Docs { .. } => "docs",
            GenerationRequest::Chat { .. } => "chat",
        }
    }
}

/// Caller error: the request is rejected before any prompt is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("{0} missing")]
    MissingField(&'static str),
    #[error("repo and files fields are required.")]
    MissingRepositoryFields,
}

/// Return `value` if it has non-whitespace content, else a `MissingField` error.
pub(crate) fn require(field: &'static str, value: String) -> Result<String, RequestError> {
    if value.trim().is_empty() {
        return Err(RequestError::MissingField(field));
    }
    Ok(value)
}
