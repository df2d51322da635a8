//! One-shot DevOps copilot CLI.
//!
//! Each subcommand builds a request payload, runs it through the same
//! orchestrator as the HTTP server, and prints the JSON response to stdout.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use copilot::core::payload::{
    ChatRequest, CreatePrRequest, DocsRequest, PrReviewRequest, TemplateRequest,
};
use copilot::core::types::ProviderKind;
use copilot::exit_codes;
use copilot::io::config::resolve_config;
use copilot::logging;
use copilot::service::{Copilot, ServiceError};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Parser)]
#[command(
    name = "copilot",
    version,
    about = "Generate DevOps artifacts, reviews and docs from the command line"
)]
struct Cli {
    /// Optional TOML config file; environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Force the offline mock provider regardless of configuration.
    #[arg(long, global = true)]
    mock: bool,

    /// Do not load a `.env` file from the working directory or its parents.
    #[arg(long, global = true)]
    no_dotenv: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a DevOps artifact (dockerfile, github_actions, ...).
    Template {
        #[arg(long)]
        project_type: String,
        #[arg(long)]
        artifact: String,
        /// Requirement as `key=value`; repeatable, kept in order.
        #[arg(long = "detail", value_name = "KEY=VALUE")]
        details: Vec<String>,
    },
    /// Review a unified diff read from a file, or stdin when omitted or `-`.
    Review {
        diff: Option<PathBuf>,
        #[arg(long)]
        language: Option<String>,
    },
    /// Generate a README from a repository summary.
    Docs {
        /// Summary text; read from stdin when omitted.
        summary: Option<String>,
    },
    /// Ask a free-form DevOps question.
    Chat { message: String },
    /// Commit local files to a branch and open a pull request.
    CreatePr {
        /// Target repository as `owner/name`.
        #[arg(long)]
        repo: String,
        /// `REPO_PATH=LOCAL_PATH`, or a single path used for both; repeatable.
        #[arg(long = "file", value_name = "PATH", required = true)]
        files: Vec<String>,
        #[arg(long)]
        branch: Option<String>,
        #[arg(long)]
        base: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if !cli.no_dotenv {
        let _ = dotenvy::dotenv();
    }
    logging::init("warn");
    let code = match run(cli).await {
        Ok(()) => exit_codes::OK,
        Err(err) => {
            eprintln!("{err:#}");
            exit_code(&err)
        }
    };
    std::process::exit(code);
}

fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ServiceError>() {
        Some(service) if service.is_client_error() => exit_codes::INVALID_REQUEST,
        _ => exit_codes::FAILURE,
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = resolve_config(cli.config.as_deref())?;
    if cli.mock {
        config.llm.provider = ProviderKind::Mock;
    }
    let copilot = Copilot::from_config(config)?;

    match cli.command {
        Command::Template {
            project_type,
            artifact,
            details,
        } => {
            let payload = TemplateRequest {
                project_type,
                artifact,
                details: Some(parse_details(&details)?),
            };
            print_json(&copilot.generate_template(payload).await?)
        }
        Command::Review { diff, language } => {
            let payload = PrReviewRequest {
                diff: read_input(diff.as_deref())?,
                language,
            };
            print_json(&copilot.review_pr(payload).await?)
        }
        Command::Docs { summary } => {
            let repo_summary = match summary {
                Some(text) => text,
                None => read_input(None)?,
            };
            print_json(&copilot.generate_docs(DocsRequest { repo_summary }).await?)
        }
        Command::Chat { message } => print_json(&copilot.chat(ChatRequest { message }).await?),
        Command::CreatePr {
            repo,
            files,
            branch,
            base,
            title,
            body,
        } => {
            let mut payload = CreatePrRequest::new(repo, read_files(&files)?);
            if let Some(branch) = branch {
                payload.branch = branch;
            }
            if let Some(base) = base {
                payload.base = base;
            }
            if let Some(title) = title {
                payload.title = title;
            }
            if let Some(body) = body {
                payload.body = body;
            }
            print_json(&copilot.create_pr_on_github(payload).await?)
        }
    }
}

/// Parse `key=value` pairs into an ordered details map.
fn parse_details(pairs: &[String]) -> Result<Map<String, Value>> {
    let mut details = Map::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("detail '{pair}' must look like key=value"))?;
        details.insert(key.trim().to_string(), Value::String(value.to_string()));
    }
    Ok(details)
}

fn read_files(specs: &[String]) -> Result<IndexMap<String, String>> {
    let mut files = IndexMap::new();
    for spec in specs {
        let (repo_path, local_path) = spec
            .split_once('=')
            .unwrap_or((spec.as_str(), spec.as_str()));
        let content =
            fs::read_to_string(local_path).with_context(|| format!("read {local_path}"))?;
        files.insert(repo_path.to_string(), content);
    }
    Ok(files)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => {
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
        }
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("read stdin")?;
            Ok(buffer)
        }
    }
}

/// Print `value` as pretty JSON with trailing newline.
fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value).context("serialize json")?;
    println!("{payload}");
    Ok(())
}
