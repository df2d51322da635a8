//! Generation engine: one live attempt, offline responder on any failure.
//!
//! [`Generator::generate`] never fails. Provider errors are recorded on the
//! returned [`GenerationResult`] and logged; they never reach response text.

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, instrument, warn};

use crate::core::mock::mock_response;
use crate::core::types::{Fallback, GenerationParams, GenerationResult, Prompt, ProviderKind};
use crate::io::config::ProviderConfig;
use crate::io::provider::{ChatCompletionsBackend, CompletionBackend, ProviderError};

/// Primary/fallback text generator over a [`CompletionBackend`].
#[derive(Debug)]
pub struct Generator<B> {
    provider: ProviderKind,
    model: String,
    timeout: Duration,
    backend: B,
}

impl Generator<ChatCompletionsBackend> {
    /// Generator backed by the configured OpenAI-compatible endpoint.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let backend = ChatCompletionsBackend::new(config)?;
        Ok(Self::new(config, backend))
    }
}

impl<B: CompletionBackend> Generator<B> {
    pub fn new(config: &ProviderConfig, backend: B) -> Self {
        Self {
            provider: config.provider,
            model: config.model.clone(),
            timeout: config.timeout(),
            backend,
        }
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[instrument(skip_all, fields(provider = %self.provider))]
    pub async fn generate(&self, prompt: &Prompt, params: GenerationParams) -> GenerationResult {
        if self.provider == ProviderKind::Mock {
            debug!("mock provider selected");
            return GenerationResult::mock(mock_response(prompt.as_str()).to_string());
        }

        let attempt = tokio::time::timeout(self.timeout, self.backend.complete(prompt, params))
            .await
            .unwrap_or(Err(ProviderError::Timeout(self.timeout)));

        match attempt {
            Ok(text) => GenerationResult::live(text),
            Err(err) => {
                warn!(
                    error = %err,
                    kind = err.kind(),
                    model = %self.model,
                    "live provider failed, falling back to mock responder"
                );
                GenerationResult::recovered(
                    mock_response(prompt.as_str()).to_string(),
                    Fallback {
                        kind: err.kind(),
                        reason: err.to_string(),
                    },
                )
            }
        }
    }
}
