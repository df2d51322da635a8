//! Copilot configuration: optional TOML file overlaid with environment variables.
//!
//! Resolved once at start-up and passed by reference afterwards; component
//! logic never reads the environment itself. Credentials are only ever taken
//! from the environment and are never serialized back to disk.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::types::ProviderKind;

pub const ENV_LLM_MODE: &str = "LLM_MODE";
pub const ENV_DEFAULT_MODEL: &str = "DEFAULT_MODEL";
pub const ENV_GROQ_API_KEY: &str = "GROQ_API_KEY";
pub const ENV_LLM_BASE_URL: &str = "LLM_BASE_URL";
pub const ENV_LLM_TIMEOUT_SECS: &str = "LLM_TIMEOUT_SECS";
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const ENV_GITHUB_API_URL: &str = "GITHUB_API_URL";

pub const DEFAULT_MODEL: &str = "llama3-70b-8192";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Top-level configuration (TOML).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CopilotConfig {
    pub llm: ProviderConfig,
    pub github: GithubConfig,
}

/// Model provider selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProviderConfig {
    pub provider: ProviderKind,
    pub model: String,
    /// OpenAI-compatible API root; `/chat/completions` is appended.
    pub base_url: String,
    /// Upper bound on a single live call, in seconds.
    pub timeout_secs: u64,
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Live,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            timeout_secs: 5,
            api_key: None,
        }
    }
}

impl ProviderConfig {
    /// Offline configuration; never performs network calls.
    pub fn mock() -> Self {
        Self {
            provider: ProviderKind::Mock,
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Repository host settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GithubConfig {
    pub api_url: String,
    #[serde(skip)]
    pub token: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GITHUB_API_URL.to_string(),
            token: None,
        }
    }
}

impl CopilotConfig {
    pub fn validate(&self) -> Result<()> {
        if self.llm.model.trim().is_empty() {
            return Err(anyhow!("llm.model must be non-empty"));
        }
        if self.llm.base_url.trim().is_empty() {
            return Err(anyhow!("llm.base_url must be non-empty"));
        }
        if self.llm.timeout_secs == 0 {
            return Err(anyhow!("llm.timeout_secs must be > 0"));
        }
        if self.github.api_url.trim().is_empty() {
            return Err(anyhow!("github.api_url must be non-empty"));
        }
        Ok(())
    }

    /// Overlay environment values onto this config.
    ///
    /// `lookup` returns the value of a variable; empty values count as unset.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(mode) = get(ENV_LLM_MODE) {
            self.llm.provider = mode
                .parse::<ProviderKind>()
                .map_err(|err: String| anyhow!(err))
                .with_context(|| format!("parse {ENV_LLM_MODE}"))?;
        }
        if let Some(model) = get(ENV_DEFAULT_MODEL) {
            self.llm.model = model;
        }
        if let Some(base_url) = get(ENV_LLM_BASE_URL) {
            self.llm.base_url = base_url;
        }
        if let Some(timeout) = get(ENV_LLM_TIMEOUT_SECS) {
            self.llm.timeout_secs = timeout
                .trim()
                .parse()
                .with_context(|| format!("parse {ENV_LLM_TIMEOUT_SECS}"))?;
        }
        if let Some(api_url) = get(ENV_GITHUB_API_URL) {
            self.github.api_url = api_url;
        }
        self.llm.api_key = get(ENV_GROQ_API_KEY);
        self.github.token = get(ENV_GITHUB_TOKEN);

        self.validate()?;
        Ok(self)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `CopilotConfig::default()`.
pub fn load_config(path: &Path) -> Result<CopilotConfig> {
    if !path.exists() {
        let cfg = CopilotConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: CopilotConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve the process configuration: optional file, then the process environment.
pub fn resolve_config(path: Option<&Path>) -> Result<CopilotConfig> {
    let base = match path {
        Some(path) => load_config(path)?,
        None => CopilotConfig::default(),
    };
    base.with_env(|name| std::env::var(name).ok())
}
