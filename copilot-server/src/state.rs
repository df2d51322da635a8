//! Shared application state for the HTTP server.

use std::sync::Arc;

use copilot::io::config::CopilotConfig;
use copilot::io::provider::ChatCompletionsBackend;
use copilot::service::Copilot;

/// Shared state accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Orchestrator shared by every request; holds no per-request state.
    pub copilot: Arc<Copilot<ChatCompletionsBackend>>,
}

impl AppState {
    pub fn new(config: CopilotConfig) -> anyhow::Result<Self> {
        Ok(Self {
            copilot: Arc::new(Copilot::from_config(config)?),
        })
    }
}
