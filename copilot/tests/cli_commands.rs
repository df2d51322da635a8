//! CLI tests for the `copilot` binary.
//!
//! Spawns the binary in mock mode and verifies stdout payloads and exit codes.

use std::process::Command;

use copilot::core::mock::MOCK_DOCKERFILE;
use copilot::exit_codes;
use serde_json::Value;

fn copilot_cmd(dir: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_copilot"));
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("GITHUB_TOKEN")
        .env_remove("LLM_MODE")
        .args(["--mock", "--no-dotenv"]);
    cmd
}

#[test]
fn template_prints_validated_json() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = copilot_cmd(temp.path())
        .args([
            "template",
            "--project-type",
            "python",
            "--artifact",
            "dockerfile",
            "--detail",
            "framework=fastapi",
        ])
        .output()
        .expect("copilot template");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let body: Value = serde_json::from_slice(&output.stdout).expect("json stdout");
    assert_eq!(body["artifact_type"], "dockerfile");
    assert_eq!(body["valid"], true);
    assert_eq!(body["content"], MOCK_DOCKERFILE);
}

#[test]
fn empty_chat_exits_with_invalid_request() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = copilot_cmd(temp.path())
        .args(["chat", ""])
        .output()
        .expect("copilot chat");

    assert_eq!(output.status.code(), Some(exit_codes::INVALID_REQUEST));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("message missing"));
}

#[test]
fn create_pr_without_token_exits_with_failure() {
    let temp = tempfile::tempdir().expect("tempdir");
    std::fs::write(temp.path().join("Dockerfile"), MOCK_DOCKERFILE).expect("write");
    let output = copilot_cmd(temp.path())
        .args(["create-pr", "--repo", "acme/app", "--file", "Dockerfile"])
        .output()
        .expect("copilot create-pr");

    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    assert!(String::from_utf8_lossy(&output.stderr).contains("GITHUB_TOKEN is missing"));
}

#[test]
fn no_dotenv_ignores_env_file_in_working_directory() {
    let temp = tempfile::tempdir().expect("tempdir");
    std::fs::write(temp.path().join(".env"), "GITHUB_TOKEN=ghp_fake\n").expect("write .env");
    std::fs::write(temp.path().join("Dockerfile"), MOCK_DOCKERFILE).expect("write");
    let output = copilot_cmd(temp.path())
        .args(["create-pr", "--repo", "acme/app", "--file", "Dockerfile"])
        .output()
        .expect("copilot create-pr");

    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    assert!(String::from_utf8_lossy(&output.stderr).contains("GITHUB_TOKEN is missing"));
}

#[test]
fn env_file_is_loaded_by_default() {
    let temp = tempfile::tempdir().expect("tempdir");
    std::fs::write(temp.path().join(".env"), "LLM_MODE=carrier-pigeon\n").expect("write .env");
    let output = Command::new(env!("CARGO_BIN_EXE_copilot"))
        .current_dir(temp.path())
        .env_remove("RUST_LOG")
        .env_remove("LLM_MODE")
        .args(["--mock", "chat", "hi"])
        .output()
        .expect("copilot chat");

    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    assert!(String::from_utf8_lossy(&output.stderr).contains("LLM_MODE"));
}
