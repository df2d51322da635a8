//! Test-only fakes for the provider and repository host seams.

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use indexmap::IndexMap;

use crate::core::types::{GenerationParams, Prompt};
use crate::io::github::{BranchCreation, FileChange, PullRequestSpec, RepositoryHost};
use crate::io::provider::{CompletionBackend, ProviderError};

/// One scripted backend answer.
#[derive(Debug)]
pub enum Reply {
    Text(String),
    Error(ProviderError),
    /// Never resolves; exercises the engine timeout.
    Stall,
}

/// Backend that replays scripted replies in order and records every prompt.
///
/// Once the script is exhausted, further calls fail with a transport error.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or_default()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(
        &self,
        prompt: &Prompt,
        _params: GenerationParams,
    ) -> Result<String, ProviderError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.as_str().to_string());
        }
        let next = self.replies.lock().ok().and_then(|mut q| q.pop_front());
        match next {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Error(err)) => Err(err),
            Some(Reply::Stall) => std::future::pending().await,
            None => Err(ProviderError::Transport("script exhausted".to_string())),
        }
    }
}

/// In-memory repository host keyed by `(repo, branch)`.
#[derive(Debug, Default)]
pub struct RecordingHost {
    state: Mutex<HostState>,
}

#[derive(Debug, Default)]
struct HostState {
    branches: IndexMap<(String, String), Branch>,
    log: Vec<String>,
    pulls: Vec<String>,
    fail_on: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct Branch {
    head: String,
    files: IndexMap<String, String>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `branch` of `repo` with a head sha and existing files.
    pub fn with_branch(self, repo: &str, branch: &str, head: &str, files: &[(&str, &str)]) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.branches.insert(
                (repo.to_string(), branch.to_string()),
                Branch {
                    head: head.to_string(),
                    files: files
                        .iter()
                        .map(|(p, c)| (p.to_string(), c.to_string()))
                        .collect(),
                },
            );
        }
        self
    }

    /// Make the operation named `op` (e.g. `put_file`) fail.
    pub fn failing_on(self, op: &str) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.fail_on = Some(op.to_string());
        }
        self
    }

    /// Ordered log of operations, e.g. `put_file Dockerfile sha=None`.
    pub fn log(&self) -> Vec<String> {
        self.state.lock().map(|s| s.log.clone()).unwrap_or_default()
    }

    pub fn file(&self, repo: &str, branch: &str, path: &str) -> Option<String> {
        let state = self.state.lock().ok()?;
        state
            .branches
            .get(&(repo.to_string(), branch.to_string()))
            .and_then(|b| b.files.get(path).cloned())
    }

    fn record(&self, op: &str, entry: String) -> Result<std::sync::MutexGuard<'_, HostState>> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| anyhow!("recording host poisoned"))?;
        state.log.push(entry);
        if state.fail_on.as_deref() == Some(op) {
            return Err(anyhow!("{op} rejected by host"));
        }
        Ok(state)
    }
}

fn blob_sha(content: &str) -> String {
    format!("sha-{}", content.len())
}

#[async_trait]
impl RepositoryHost for RecordingHost {
    async fn branch_head(&self, repo: &str, branch: &str) -> Result<String> {
        let state = self.record("branch_head", format!("branch_head {branch}"))?;
        state
            .branches
            .get(&(repo.to_string(), branch.to_string()))
            .map(|b| b.head.clone())
            .ok_or_else(|| anyhow!("Branch not found: {branch}"))
    }

    async fn create_branch(&self, repo: &str, branch: &str, sha: &str) -> Result<BranchCreation> {
        let mut state = self.record("create_branch", format!("create_branch {branch} from {sha}"))?;
        let key = (repo.to_string(), branch.to_string());
        if state.branches.contains_key(&key) {
            return Ok(BranchCreation::AlreadyExists);
        }
        let files = state
            .branches
            .values()
            .find(|b| b.head == sha)
            .map(|b| b.files.clone())
            .unwrap_or_default();
        state.branches.insert(
            key,
            Branch {
                head: sha.to_string(),
                files,
            },
        );
        Ok(BranchCreation::Created)
    }

    async fn file_sha(&self, repo: &str, path: &str, branch: &str) -> Result<Option<String>> {
        let state = self.record("file_sha", format!("file_sha {path}"))?;
        Ok(state
            .branches
            .get(&(repo.to_string(), branch.to_string()))
            .and_then(|b| b.files.get(path))
            .map(|content| blob_sha(content)))
    }

    async fn put_file(&self, repo: &str, change: &FileChange<'_>) -> Result<()> {
        let mut state = self.record(
            "put_file",
            format!("put_file {} sha={:?} msg={}", change.path, change.sha, change.message),
        )?;
        let branch = state
            .branches
            .get_mut(&(repo.to_string(), change.branch.to_string()))
            .ok_or_else(|| anyhow!("Branch not found: {}", change.branch))?;
        branch
            .files
            .insert(change.path.to_string(), change.content.to_string());
        Ok(())
    }

    async fn open_pull_request(&self, repo: &str, pr: &PullRequestSpec<'_>) -> Result<String> {
        let mut state = self.record(
            "open_pull_request",
            format!("open_pull_request {} -> {} title={}", pr.head, pr.base, pr.title),
        )?;
        state.pulls.push(pr.head.to_string());
        Ok(format!("https://github.com/{repo}/pull/{}", state.pulls.len()))
    }
}
