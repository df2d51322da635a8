//! Wire payloads carried unchanged by the HTTP and CLI surfaces.
//!
//! Request payloads are lenient on deserialization (optional fields default the
//! way callers expect) and strict on conversion: `into_request()` is the single
//! place where client-input errors are raised.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::core::request::{GenerationRequest, RequestError, require};

pub const DEFAULT_REVIEW_LANGUAGE: &str = "python";
pub const DEFAULT_PR_BRANCH: &str = "ai-generated-devops";
pub const DEFAULT_PR_BASE: &str = "main";
pub const DEFAULT_PR_TITLE: &str = "AI Generated DevOps Files";
pub const DEFAULT_PR_BODY: &str = "This PR contains AI-generated DevOps resources.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRequest {
    pub project_type: String,
    pub artifact: String,
    #[serde(default)]
    pub details: Option<Map<String, Value>>,
}

impl TemplateRequest {
    pub fn into_request(self) -> Result<GenerationRequest, RequestError> {
        Ok(GenerationRequest::Template {
            project_type: require("project_type", self.project_type)?,
            artifact: require("artifact", self.artifact)?,
            details: self.details.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateResponse {
    /// Artifact name exactly as requested.
    pub artifact_type: String,
    pub valid: bool,
    /// Present only for Dockerfile artifacts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrReviewRequest {
    pub diff: String,
    #[serde(default)]
    pub language: Option<String>,
}

impl PrReviewRequest {
    pub fn into_request(self) -> GenerationRequest {
        GenerationRequest::PrReview {
            diff: self.diff,
            language: self
                .language
                .unwrap_or_else(|| DEFAULT_REVIEW_LANGUAGE.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub review: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocsRequest {
    pub repo_summary: String,
}

impl DocsRequest {
    pub fn into_request(self) -> GenerationRequest {
        GenerationRequest::Docs {
            repo_summary: self.repo_summary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocsResponse {
    pub readme: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

impl ChatRequest {
    pub fn into_request(self) -> Result<GenerationRequest, RequestError> {
        Ok(GenerationRequest::Chat {
            message: require("message", self.message)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Files to publish on a branch, followed by a pull request into `base`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePrRequest {
    /// `owner/name` of the target repository.
    #[serde(default, deserialize_with = "null_as_default")]
    pub repo: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "default_base")]
    pub base: String,
    /// Repository path to file content, committed in insertion order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub files: IndexMap<String, String>,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_body")]
    pub body: String,
}

impl CreatePrRequest {
    pub fn new(repo: impl Into<String>, files: IndexMap<String, String>) -> Self {
        Self {
            repo: repo.into(),
            branch: default_branch(),
            base: default_base(),
            files,
            title: default_title(),
            body: default_body(),
        }
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        if self.repo.trim().is_empty() || self.files.is_empty() {
            return Err(RequestError::MissingRepositoryFields);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePrResponse {
    pub pr_url: String,
}

/// Treat an explicit `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_branch() -> String {
    DEFAULT_PR_BRANCH.to_string()
}

fn default_base() -> String {
    DEFAULT_PR_BASE.to_string()
}

fn default_title() -> String {
    DEFAULT_PR_TITLE.to_string()
}

fn default_body() -> String {
    DEFAULT_PR_BODY.to_string()
}
