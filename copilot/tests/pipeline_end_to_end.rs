//! End-to-end pipeline tests through the public `Copilot` orchestrator.
//!
//! These drive full requests (payload → prompt → generation → validation →
//! response) with scripted backends and an in-memory repository host, so no
//! test touches the network.

use copilot::core::mock::{MOCK_CI_PIPELINE, MOCK_DOCKERFILE};
use copilot::core::payload::{ChatRequest, CreatePrRequest, TemplateRequest};
use copilot::core::types::ProviderKind;
use copilot::io::config::{CopilotConfig, ProviderConfig};
use copilot::io::provider::ProviderError;
use copilot::service::{Copilot, ServiceError};
use copilot::test_support::{RecordingHost, Reply, ScriptedBackend};
use indexmap::IndexMap;
use serde_json::json;

fn config(provider: ProviderKind) -> CopilotConfig {
    CopilotConfig {
        llm: ProviderConfig {
            provider,
            timeout_secs: 1,
            ..ProviderConfig::default()
        },
        ..CopilotConfig::default()
    }
}

fn dockerfile_request() -> TemplateRequest {
    serde_json::from_value(json!({
        "project_type": "python",
        "artifact": "dockerfile",
        "details": {"framework": "fastapi", "port": 8000}
    }))
    .expect("payload")
}

#[tokio::test]
async fn mock_dockerfile_template_is_canned_and_clean() {
    let copilot = Copilot::new(config(ProviderKind::Mock), ScriptedBackend::new(vec![]));
    let resp = copilot
        .generate_template(dockerfile_request())
        .await
        .expect("template");

    assert_eq!(resp.content, MOCK_DOCKERFILE);
    assert!(resp.valid);
    assert_eq!(resp.warnings, Some(vec![]));
    assert_eq!(copilot.generator().backend().calls(), 0);
}

/// A live provider that fails produces the same response mock mode would.
#[tokio::test]
async fn failed_live_call_matches_mock_response() {
    let mock = Copilot::new(config(ProviderKind::Mock), ScriptedBackend::new(vec![]))
        .generate_template(dockerfile_request())
        .await
        .expect("mock template");
    let live = Copilot::new(
        config(ProviderKind::Live),
        ScriptedBackend::new(vec![Reply::Error(ProviderError::MissingCredential(
            "GROQ_API_KEY",
        ))]),
    )
    .generate_template(dockerfile_request())
    .await
    .expect("live template");

    assert_eq!(live, mock);
}

#[tokio::test]
async fn live_yaml_pipeline_is_reformatted() {
    let copilot = Copilot::new(
        config(ProviderKind::Live),
        ScriptedBackend::new(vec![Reply::Text(MOCK_CI_PIPELINE.to_string())]),
    );
    let resp = copilot
        .generate_template(TemplateRequest {
            project_type: "python".to_string(),
            artifact: "github_actions".to_string(),
            details: None,
        })
        .await
        .expect("template");

    assert!(resp.valid);
    assert!(resp.warnings.is_none());
    assert!(resp.content.starts_with("name: CI\n"));
    let reparsed: serde_yaml::Value = serde_yaml::from_str(&resp.content).expect("yaml");
    assert_eq!(reparsed["jobs"]["build"]["runs-on"].as_str(), Some("ubuntu-latest"));

    let prompts = copilot.generator().backend().prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Now generate the github_actions file"));
}

#[tokio::test]
async fn empty_chat_never_reaches_the_provider() {
    let copilot = Copilot::new(
        config(ProviderKind::Live),
        ScriptedBackend::new(vec![Reply::Text("unused".to_string())]),
    );
    let err = copilot
        .chat(ChatRequest {
            message: "   ".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::InvalidRequest(_)));
    assert_eq!(copilot.generator().backend().calls(), 0);
}

/// Generated files land on a fresh branch: one update, one create, then a PR.
#[tokio::test]
async fn create_pr_commits_files_in_order() {
    let host = RecordingHost::new().with_branch(
        "acme/app",
        "main",
        "base-sha",
        &[("Dockerfile", "FROM old")],
    );
    let copilot = Copilot::new(config(ProviderKind::Mock), ScriptedBackend::new(vec![]));

    let mut files = IndexMap::new();
    files.insert("Dockerfile".to_string(), MOCK_DOCKERFILE.to_string());
    files.insert(
        ".github/workflows/ci.yml".to_string(),
        MOCK_CI_PIPELINE.to_string(),
    );
    let resp = copilot
        .create_pr(&host, CreatePrRequest::new("acme/app", files))
        .await
        .expect("create pr");

    assert_eq!(resp.pr_url, "https://github.com/acme/app/pull/1");
    assert_eq!(
        host.log(),
        vec![
            "branch_head main".to_string(),
            "create_branch ai-generated-devops from base-sha".to_string(),
            "file_sha Dockerfile".to_string(),
            "put_file Dockerfile sha=Some(\"sha-8\") msg=AI: Update Dockerfile".to_string(),
            "file_sha .github/workflows/ci.yml".to_string(),
            "put_file .github/workflows/ci.yml sha=None msg=AI: Add .github/workflows/ci.yml"
                .to_string(),
            "open_pull_request ai-generated-devops -> main title=AI Generated DevOps Files"
                .to_string(),
        ]
    );
    assert_eq!(
        host.file("acme/app", "ai-generated-devops", "Dockerfile").as_deref(),
        Some(MOCK_DOCKERFILE)
    );
    assert_eq!(
        host.file("acme/app", "main", "Dockerfile").as_deref(),
        Some("FROM old")
    );
}

#[tokio::test]
async fn create_pr_reuses_existing_branch() {
    let host = RecordingHost::new()
        .with_branch("acme/app", "main", "base-sha", &[])
        .with_branch("acme/app", "ai-generated-devops", "older-sha", &[]);
    let copilot = Copilot::new(config(ProviderKind::Mock), ScriptedBackend::new(vec![]));

    let mut files = IndexMap::new();
    files.insert("ci.yml".to_string(), "on: push".to_string());
    copilot
        .create_pr(&host, CreatePrRequest::new("acme/app", files))
        .await
        .expect("create pr");

    assert_eq!(
        host.file("acme/app", "ai-generated-devops", "ci.yml").as_deref(),
        Some("on: push")
    );
}
