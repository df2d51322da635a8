//! Format-aware checks and best-effort repair of generated artifacts.
//!
//! Repairs never fail: when text cannot be parsed it is returned unchanged.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::core::types::{ArtifactKind, ValidationOutcome};

pub const WARN_MISSING_FROM: &str = "Missing FROM instruction";
pub const WARN_MISSING_CMD: &str = "Missing CMD or ENTRYPOINT";
pub const WARN_LATEST_TAG: &str = "Avoid using 'latest' tags in production Dockerfiles";

static FROM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^FROM\s+").expect("FROM pattern should compile"));
static CMD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:CMD|ENTRYPOINT)\s+").expect("CMD pattern should compile")
});

/// Basic Dockerfile lint. All checks always run; `valid` iff no warnings.
pub fn check_dockerfile(text: &str) -> (bool, Vec<String>) {
    let mut warnings = Vec::new();
    if !FROM_RE.is_match(text) {
        warnings.push(WARN_MISSING_FROM.to_string());
    }
    if !CMD_RE.is_match(text) {
        warnings.push(WARN_MISSING_CMD.to_string());
    }
    if text.contains("latest") {
        warnings.push(WARN_LATEST_TAG.to_string());
    }
    (warnings.is_empty(), warnings)
}

pub fn is_yaml(text: &str) -> bool {
    serde_yaml::from_str::<serde_yaml::Value>(text).is_ok()
}

/// Re-serialize YAML with stable formatting, keeping mapping order.
///
/// Scalar styling may change (quoting, wrapping). Unparsable input is returned as is.
pub fn try_fix_yaml(text: &str) -> String {
    reserialize_yaml(text).unwrap_or_else(|| text.to_string())
}

pub fn is_json(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text).is_ok()
}

/// Pretty-print JSON with two-space indentation; unparsable input is returned as is.
pub fn pretty_json(text: &str) -> String {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| text.to_string())
}

fn reserialize_yaml(text: &str) -> Option<String> {
    let value: serde_yaml::Value = serde_yaml::from_str(text).ok()?;
    serde_yaml::to_string(&value).ok()
}

/// Classify and repair generated text for the requested artifact.
///
/// Dockerfiles are linted and returned raw. Everything else is tried as YAML,
/// then JSON, then passed through as plain text. YAML goes first because most
/// JSON documents also parse as YAML.
pub fn validate_artifact(requested_artifact: &str, text: &str) -> ValidationOutcome {
    let outcome = if requested_artifact.eq_ignore_ascii_case("dockerfile") {
        let (valid, warnings) = check_dockerfile(text);
        ValidationOutcome {
            artifact_kind: ArtifactKind::Dockerfile,
            valid,
            warnings,
            content: text.to_string(),
        }
    } else if is_yaml(text) {
        ValidationOutcome {
            artifact_kind: ArtifactKind::Yaml,
            valid: true,
            warnings: Vec::new(),
            content: try_fix_yaml(text),
        }
    } else if is_json(text) {
        ValidationOutcome {
            artifact_kind: ArtifactKind::Json,
            valid: true,
            warnings: Vec::new(),
            content: pretty_json(text),
        }
    } else {
        ValidationOutcome {
            artifact_kind: ArtifactKind::Plain,
            valid: true,
            warnings: Vec::new(),
            content: text.to_string(),
        }
    };
    debug!(
        artifact = requested_artifact,
        kind = ?outcome.artifact_kind,
        valid = outcome.valid,
        warnings = outcome.warnings.len(),
        "validated artifact"
    );
    outcome
}
