//! Repository host adapter: branch, commit and pull request over the GitHub REST API.
//!
//! [`publish_files`] drives the whole mutation through the [`RepositoryHost`]
//! trait so the sequence can be tested against an in-memory host.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::core::payload::CreatePrRequest;
use crate::io::config::{ENV_GITHUB_TOKEN, GithubConfig};

const GITHUB_API_VERSION: &str = "2022-11-28";

/// Outcome of creating the target branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchCreation {
    Created,
    AlreadyExists,
}

/// A single file write on a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange<'a> {
    pub path: &'a str,
    pub content: &'a str,
    pub branch: &'a str,
    pub message: String,
    /// Blob sha of the file being replaced; `None` creates the file.
    pub sha: Option<String>,
}

/// Pull request to open from `head` into `base`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestSpec<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub head: &'a str,
    pub base: &'a str,
}

/// Operations needed to publish generated files as a pull request.
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// Latest commit sha of `branch`.
    async fn branch_head(&self, repo: &str, branch: &str) -> Result<String>;
    async fn create_branch(&self, repo: &str, branch: &str, sha: &str) -> Result<BranchCreation>;
    /// Blob sha of `path` on `branch`, or `None` if the file does not exist.
    async fn file_sha(&self, repo: &str, path: &str, branch: &str) -> Result<Option<String>>;
    async fn put_file(&self, repo: &str, change: &FileChange<'_>) -> Result<()>;
    /// Open the pull request and return its web URL.
    async fn open_pull_request(&self, repo: &str, pr: &PullRequestSpec<'_>) -> Result<String>;
}

/// Create `request.branch` from `request.base`, commit every file, and open a PR.
///
/// Returns the pull request URL. Nothing is retried; the first failure aborts.
#[instrument(
    skip_all,
    fields(
        repo = %request.repo,
        branch = %request.branch,
        base = %request.base,
        files = request.files.len(),
    )
)]
pub async fn publish_files<H: RepositoryHost + ?Sized>(
    host: &H,
    request: &CreatePrRequest,
) -> Result<String> {
    let repo = request.repo.as_str();
    let base_sha = host
        .branch_head(repo, &request.base)
        .await
        .with_context(|| format!("resolve base branch '{}'", request.base))?;

    match host
        .create_branch(repo, &request.branch, &base_sha)
        .await
        .with_context(|| format!("create branch '{}'", request.branch))?
    {
        BranchCreation::Created => info!(sha = %base_sha, "created branch"),
        BranchCreation::AlreadyExists => warn!("branch already exists, reusing it"),
    }

    for (path, content) in &request.files {
        let existing = host
            .file_sha(repo, path, &request.branch)
            .await
            .with_context(|| format!("look up {path}"))?;
        let message = match existing {
            Some(_) => format!("AI: Update {path}"),
            None => format!("AI: Add {path}"),
        };
        debug!(path = %path, update = existing.is_some(), "writing file");
        host.put_file(
            repo,
            &FileChange {
                path,
                content,
                branch: &request.branch,
                message,
                sha: existing,
            },
        )
        .await
        .with_context(|| format!("write {path}"))?;
    }

    let url = host
        .open_pull_request(
            repo,
            &PullRequestSpec {
                title: &request.title,
                body: &request.body,
                head: &request.branch,
                base: &request.base,
            },
        )
        .await
        .context("open pull request")?;
    info!(pr_url = %url, "opened pull request");
    Ok(url)
}

#[derive(Debug, Deserialize)]
struct BranchResponse {
    commit: CommitRef,
}

#[derive(Debug, Deserialize)]
struct CommitRef {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    html_url: String,
}

#[derive(Debug, Serialize)]
struct CreateRefBody<'a> {
    #[serde(rename = "ref")]
    git_ref: String,
    sha: &'a str,
}

#[derive(Debug, Serialize)]
struct PutContentBody<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct CreatePullBody<'a> {
    title: &'a str,
    body: &'a str,
    head: &'a str,
    base: &'a str,
}

/// GitHub REST client authenticated with a token.
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
    api_url: Url,
    token: String,
}

impl GithubClient {
    /// Build a client, failing if no token is configured.
    pub fn from_config(config: &GithubConfig) -> Result<Self> {
        let token = config.token.clone().ok_or_else(|| {
            anyhow!("{ENV_GITHUB_TOKEN} is missing; set it in the environment or .env")
        })?;
        Self::new(&config.api_url, token)
    }

    pub fn new(api_url: &str, token: String) -> Result<Self> {
        let api_url =
            Url::parse(api_url).with_context(|| format!("parse github api url {api_url}"))?;
        if api_url.cannot_be_a_base() {
            return Err(anyhow!("github api url {api_url} cannot be a base"));
        }
        let client = Client::builder()
            .user_agent(concat!("devops-copilot/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build github http client")?;
        Ok(Self {
            client,
            api_url,
            token,
        })
    }

    /// `{api_url}/repos/{owner}/{name}/{rest...}` with each segment escaped.
    fn repo_url(&self, repo: &str, rest: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("repos");
            segments.extend(repo.split('/'));
            for part in rest {
                segments.extend(part.split('/'));
            }
        }
        url
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }
}

async fn ensure_success(response: Response, action: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(anyhow!("{action} failed: HTTP {}: {}", status.as_u16(), body.trim()))
}

#[async_trait]
impl RepositoryHost for GithubClient {
    async fn branch_head(&self, repo: &str, branch: &str) -> Result<String> {
        let url = self.repo_url(repo, &["branches", branch]);
        let response = self
            .request(self.client.get(url))
            .send()
            .await
            .context("get branch")?;
        let parsed: BranchResponse = ensure_success(response, "get branch")
            .await?
            .json()
            .await
            .context("parse branch response")?;
        Ok(parsed.commit.sha)
    }

    async fn create_branch(&self, repo: &str, branch: &str, sha: &str) -> Result<BranchCreation> {
        let url = self.repo_url(repo, &["git", "refs"]);
        let body = CreateRefBody {
            git_ref: format!("refs/heads/{branch}"),
            sha,
        };
        let response = self
            .request(self.client.post(url))
            .json(&body)
            .send()
            .await
            .context("create ref")?;
        if response.status() == StatusCode::UNPROCESSABLE_ENTITY {
            let detail = response.text().await.unwrap_or_default();
            debug!(detail = %detail.trim(), "create ref rejected as existing");
            return Ok(BranchCreation::AlreadyExists);
        }
        ensure_success(response, "create ref").await?;
        Ok(BranchCreation::Created)
    }

    async fn file_sha(&self, repo: &str, path: &str, branch: &str) -> Result<Option<String>> {
        let mut url = self.repo_url(repo, &["contents", path]);
        url.query_pairs_mut().append_pair("ref", branch);
        let response = self
            .request(self.client.get(url))
            .send()
            .await
            .context("get contents")?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let parsed: ContentResponse = ensure_success(response, "get contents")
            .await?
            .json()
            .await
            .context("parse contents response")?;
        Ok(Some(parsed.sha))
    }

    async fn put_file(&self, repo: &str, change: &FileChange<'_>) -> Result<()> {
        let url = self.repo_url(repo, &["contents", change.path]);
        let body = PutContentBody {
            message: &change.message,
            content: STANDARD.encode(change.content),
            branch: change.branch,
            sha: change.sha.as_deref(),
        };
        let response = self
            .request(self.client.put(url))
            .json(&body)
            .send()
            .await
            .context("put contents")?;
        ensure_success(response, "put contents").await?;
        Ok(())
    }

    async fn open_pull_request(&self, repo: &str, pr: &PullRequestSpec<'_>) -> Result<String> {
        let url = self.repo_url(repo, &["pulls"]);
        let body = CreatePullBody {
            title: pr.title,
            body: pr.body,
            head: pr.head,
            base: pr.base,
        };
        let response = self
            .request(self.client.post(url))
            .json(&body)
            .send()
            .await
            .context("create pull request")?;
        let parsed: PullResponse = ensure_success(response, "create pull request")
            .await?
            .json()
            .await
            .context("parse pull request response")?;
        Ok(parsed.html_url)
    }
}
