//! Orchestrator: payload → prompt → generation → validation → response.
//!
//! Every surface (HTTP, CLI) goes through [`Copilot`], so both share the same
//! input rules and fallback behavior.

use thiserror::Error;
use tracing::{info, instrument};

use crate::core::payload::{
    ChatRequest, ChatResponse, CreatePrRequest, CreatePrResponse, DocsRequest, DocsResponse,
    PrReviewRequest, ReviewResponse, TemplateRequest, TemplateResponse,
};
use crate::core::prompt::PromptBuilder;
use crate::core::request::{GenerationRequest, RequestError};
use crate::core::types::{ArtifactKind, GenerationParams, GenerationResult};
use crate::core::validator::validate_artifact;
use crate::engine::Generator;
use crate::io::config::CopilotConfig;
use crate::io::github::{GithubClient, RepositoryHost, publish_files};
use crate::io::provider::{ChatCompletionsBackend, CompletionBackend};

/// Failure surfaced to callers. Provider failures never appear here.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    InvalidRequest(#[from] RequestError),
    #[error("{0:#}")]
    Repository(anyhow::Error),
    #[error("render prompt: {0}")]
    Prompt(#[from] minijinja::Error),
}

impl ServiceError {
    /// True for errors caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ServiceError::InvalidRequest(_))
    }
}

/// Entry point shared by the server and the CLI.
#[derive(Debug)]
pub struct Copilot<B> {
    generator: Generator<B>,
    prompts: PromptBuilder,
    config: CopilotConfig,
}

impl Copilot<ChatCompletionsBackend> {
    pub fn from_config(config: CopilotConfig) -> anyhow::Result<Self> {
        let generator = Generator::from_config(&config.llm)?;
        Ok(Self::with_generator(config, generator))
    }
}

impl<B: CompletionBackend> Copilot<B> {
    pub fn new(config: CopilotConfig, backend: B) -> Self {
        let generator = Generator::new(&config.llm, backend);
        Self::with_generator(config, generator)
    }

    fn with_generator(config: CopilotConfig, generator: Generator<B>) -> Self {
        Self {
            generator,
            prompts: PromptBuilder::new(),
            config,
        }
    }

    pub fn config(&self) -> &CopilotConfig {
        &self.config
    }

    pub fn generator(&self) -> &Generator<B> {
        &self.generator
    }

    async fn run(&self, request: &GenerationRequest) -> Result<GenerationResult, ServiceError> {
        let prompt = self.prompts.build(request)?;
        let result = self
            .generator
            .generate(&prompt, GenerationParams::default())
            .await;
        info!(
            request = request.kind(),
            provider = %result.provider_used,
            fallback = result.fell_back(),
            "generated"
        );
        Ok(result)
    }

    #[instrument(skip_all, fields(artifact = %payload.artifact))]
    pub async fn generate_template(
        &self,
        payload: TemplateRequest,
    ) -> Result<TemplateResponse, ServiceError> {
        let artifact_type = payload.artifact.clone();
        let request = payload.into_request()?;
        let generated = self.run(&request).await?;
        let outcome = validate_artifact(&artifact_type, &generated.text);
        let warnings =
            (outcome.artifact_kind == ArtifactKind::Dockerfile).then_some(outcome.warnings);
        Ok(TemplateResponse {
            artifact_type,
            valid: outcome.valid,
            warnings,
            content: outcome.content,
        })
    }

    #[instrument(skip_all)]
    pub async fn review_pr(
        &self,
        payload: PrReviewRequest,
    ) -> Result<ReviewResponse, ServiceError> {
        let generated = self.run(&payload.into_request()).await?;
        Ok(ReviewResponse {
            review: generated.text,
        })
    }

    #[instrument(skip_all)]
    pub async fn generate_docs(&self, payload: DocsRequest) -> Result<DocsResponse, ServiceError> {
        let generated = self.run(&payload.into_request()).await?;
        Ok(DocsResponse {
            readme: generated.text,
        })
    }

    #[instrument(skip_all)]
    pub async fn chat(&self, payload: ChatRequest) -> Result<ChatResponse, ServiceError> {
        let request = payload.into_request()?;
        let generated = self.run(&request).await?;
        Ok(ChatResponse {
            reply: generated.text,
        })
    }

    /// Publish `payload.files` through `host` and open a pull request.
    pub async fn create_pr<H: RepositoryHost + ?Sized>(
        &self,
        host: &H,
        payload: CreatePrRequest,
    ) -> Result<CreatePrResponse, ServiceError> {
        payload.validate()?;
        let pr_url = publish_files(host, &payload)
            .await
            .map_err(ServiceError::Repository)?;
        Ok(CreatePrResponse { pr_url })
    }

    /// [`Copilot::create_pr`] against the configured GitHub API.
    ///
    /// The client is built here, so a missing token only fails this call.
    pub async fn create_pr_on_github(
        &self,
        payload: CreatePrRequest,
    ) -> Result<CreatePrResponse, ServiceError> {
        payload.validate()?;
        let host =
            GithubClient::from_config(&self.config.github).map_err(ServiceError::Repository)?;
        self.create_pr(&host, payload).await
    }
}
