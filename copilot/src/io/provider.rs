//! Live model provider over an OpenAI-compatible chat completions API.
//!
//! The [`CompletionBackend`] trait decouples the generation engine from the
//! HTTP client; tests use scripted backends that never touch the network.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::core::types::{GenerationParams, Prompt};
use crate::io::config::{ENV_GROQ_API_KEY, ProviderConfig};

/// System message sent ahead of every prompt.
pub const SYSTEM_PROMPT: &str = "You are a senior DevOps engineer.";

/// Why a live completion could not be produced.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("missing credential: {0} is not set")]
    MissingCredential(&'static str),
    #[error("provider call timed out after {0:?}")]
    Timeout(Duration),
    #[error("provider request failed: {0}")]
    Transport(String),
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Stable short label for logs and fallback records.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::MissingCredential(_) => "missing_credential",
            ProviderError::Timeout(_) => "timeout",
            ProviderError::Transport(_) => "transport",
            ProviderError::Status { .. } => "status",
            ProviderError::Malformed(_) => "malformed",
        }
    }
}

/// Abstraction over live completion backends.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Produce a single completion for `prompt`. Exactly one attempt.
    async fn complete(
        &self,
        prompt: &Prompt,
        params: GenerationParams,
    ) -> Result<String, ProviderError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Backend that POSTs to `{base_url}/chat/completions`.
#[derive(Debug, Clone)]
pub struct ChatCompletionsBackend {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl ChatCompletionsBackend {
    pub fn new(config: &ProviderConfig) -> anyhow::Result<Self> {
        let timeout = config.timeout();
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("devops-copilot/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build provider http client")?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionBackend for ChatCompletionsBackend {
    #[instrument(skip_all, fields(model = %self.model, max_tokens = params.max_tokens))]
    async fn complete(
        &self,
        prompt: &Prompt,
        params: GenerationParams,
    ) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential(ENV_GROQ_API_KEY))?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt.as_str(),
                },
            ],
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        };

        debug!(endpoint = %self.endpoint, "calling live provider");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|err| {
            if err.is_timeout() {
                ProviderError::Timeout(self.timeout)
            } else {
                ProviderError::Malformed(err.to_string())
            }
        })?;
        extract_completion(parsed)
    }
}

impl ChatCompletionsBackend {
    fn transport_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.timeout)
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

fn extract_completion(response: ChatResponse) -> Result<String, ProviderError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Malformed("no choices in response".to_string()))?;
    match choice.message.content {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ProviderError::Malformed("empty completion".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn live_config(base_url: &str, api_key: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            base_url: base_url.to_string(),
            api_key: api_key.map(str::to_string),
            timeout_secs: 2,
            ..ProviderConfig::default()
        }
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer gsk_test"))
            .and(body_partial_json(json!({
                "model": "llama3-70b-8192",
                "max_tokens": 800,
                "messages": [
                    {"role": "system", "content": SYSTEM_PROMPT},
                    {"role": "user", "content": "hello"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "FROM alpine"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = ChatCompletionsBackend::new(&live_config(&server.uri(), Some("gsk_test")))
            .expect("backend");
        let text = backend
            .complete(&Prompt::new("hello"), GenerationParams::default())
            .await
            .expect("completion");
        assert_eq!(text, "FROM alpine");
    }

    #[tokio::test]
    async fn missing_key_fails_without_calling_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let backend =
            ChatCompletionsBackend::new(&live_config(&server.uri(), None)).expect("backend");
        let err = backend
            .complete(&Prompt::new("hello"), GenerationParams::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "missing_credential");
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[tokio::test]
    async fn error_status_is_reported_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(404).set_body_string("model `nope` does not exist"),
            )
            .mount(&server)
            .await;

        let backend =
            ChatCompletionsBackend::new(&live_config(&server.uri(), Some("k"))).expect("backend");
        let err = backend
            .complete(&Prompt::new("hello"), GenerationParams::default())
            .await
            .unwrap_err();
        match err {
            ProviderError::Status { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("does not exist"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_choices_are_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let backend =
            ChatCompletionsBackend::new(&live_config(&server.uri(), Some("k"))).expect("backend");
        let err = backend
            .complete(&Prompt::new("hello"), GenerationParams::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "malformed");
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let backend = ChatCompletionsBackend::new(&live_config("http://localhost:9/v1/", None))
            .expect("backend");
        assert_eq!(backend.endpoint(), "http://localhost:9/v1/chat/completions");
    }
}
