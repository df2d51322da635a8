//! Shared value types for the generation pipeline.
//!
//! Everything here is a short-lived value: built per request, returned to the
//! caller, never persisted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which backend produced (or is configured to produce) generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Deterministic offline responder.
    Mock,
    /// Remote model service.
    #[serde(alias = "groq", alias = "openai")]
    Live,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Mock => "mock",
            ProviderKind::Live => "live",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    /// Accepts `mock` and `live`, plus the vendor names `groq`/`openai` for live.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(ProviderKind::Mock),
            "live" | "groq" | "openai" => Ok(ProviderKind::Live),
            other => Err(format!(
                "unknown provider mode '{other}' (expected mock or live)"
            )),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sampling parameters forwarded to the live provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 800,
            temperature: 0.2,
        }
    }
}

/// Instruction text handed to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Record of a live call that was replaced by the offline responder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fallback {
    /// Short machine-readable failure class (e.g. `timeout`).
    pub kind: &'static str,
    /// Human-readable error message from the failed attempt.
    pub reason: String,
}

/// Text produced by the generation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub text: String,
    pub provider_used: ProviderKind,
    /// Set iff a live call was attempted and failed.
    pub fallback: Option<Fallback>,
}

impl GenerationResult {
    pub fn live(text: String) -> Self {
        Self {
            text,
            provider_used: ProviderKind::Live,
            fallback: None,
        }
    }

    pub fn mock(text: String) -> Self {
        Self {
            text,
            provider_used: ProviderKind::Mock,
            fallback: None,
        }
    }

    pub fn recovered(text: String, fallback: Fallback) -> Self {
        Self {
            text,
            provider_used: ProviderKind::Mock,
            fallback: Some(fallback),
        }
    }

    pub fn fell_back(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Classification assigned to generated text by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Dockerfile,
    Yaml,
    Json,
    Plain,
}

/// Result of validating and optionally repairing generated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub artifact_kind: ArtifactKind,
    pub valid: bool,
    pub warnings: Vec<String>,
    /// Possibly repaired artifact; the original text when repair was not possible.
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_parses_vendor_aliases() {
        assert_eq!("mock".parse::<ProviderKind>(), Ok(ProviderKind::Mock));
        assert_eq!("Groq".parse::<ProviderKind>(), Ok(ProviderKind::Live));
        assert_eq!("openai".parse::<ProviderKind>(), Ok(ProviderKind::Live));
        assert!("bogus".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn recovered_result_reports_mock_provider() {
        let result = GenerationResult::recovered(
            "text".to_string(),
            Fallback {
                kind: "timeout",
                reason: "deadline elapsed".to_string(),
            },
        );
        assert_eq!(result.provider_used, ProviderKind::Mock);
        assert!(result.fell_back());
        assert!(!GenerationResult::live("x".to_string()).fell_back());
    }
}
