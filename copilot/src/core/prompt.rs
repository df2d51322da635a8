//! Prompt builder: turns a [`GenerationRequest`] into instruction text.
//!
//! Rendering is pure and deterministic. Templates are embedded at compile time
//! and absent or empty fields render as empty sections; render errors are
//! returned to the caller rather than panicking.

use minijinja::{Environment, context};
use serde_json::{Map, Value};
use tracing::debug;

use crate::core::request::GenerationRequest;
use crate::core::types::Prompt;

const TEMPLATE_TEMPLATE: &str = include_str!("prompts/template.md");
const PR_REVIEW_TEMPLATE: &str = include_str!("prompts/pr_review.md");
const DOCS_TEMPLATE: &str = include_str!("prompts/docs.md");

const CHAT_PREAMBLE: &str = "You are a senior DevOps engineer.";

/// Description used for artifact kinds without a canned example.
pub const NO_EXAMPLE_DESCRIPTION: &str = "No example available";

/// Canned few-shot example for a known artifact kind.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactExample {
    pub kind: &'static str,
    pub description: &'static str,
    pub example: &'static str,
}

/// Few-shot examples keyed by lowercase artifact kind.
pub const ARTIFACT_EXAMPLES: &[ArtifactExample] = &[
    ArtifactExample {
        kind: "dockerfile",
        description: "Basic Python FastAPI Dockerfile",
        example: "FROM python:3.10-slim
WORKDIR /app
COPY . .
RUN pip install -r requirements.txt
CMD [\"uvicorn\", \"main:app\", \"--host\", \"0.0.0.0\", \"--port\", \"8000\"]",
    },
    ArtifactExample {
        kind: "github_actions",
        description: "Python CI pipeline example",
        example: "name: CI
on: [push, pull_request]
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v3
      - name: Set up Python
        uses: actions/setup-python@v4
        with:
          python-version: '3.10'
      - run: pip install -r requirements.txt
      - run: pytest -q",
    },
];

/// Look up the canned example for `kind` (already lowercased).
pub fn example_for(kind: &str) -> Option<&'static ArtifactExample> {
    ARTIFACT_EXAMPLES.iter().find(|entry| entry.kind == kind)
}

/// Builds prompts for every [`GenerationRequest`] variant.
#[derive(Debug)]
pub struct PromptBuilder {
    env: Environment<'static>,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("template", TEMPLATE_TEMPLATE)
            .expect("template prompt should be valid");
        env.add_template("pr_review", PR_REVIEW_TEMPLATE)
            .expect("pr_review prompt should be valid");
        env.add_template("docs", DOCS_TEMPLATE)
            .expect("docs prompt should be valid");
        Self { env }
    }

    /// Build the prompt for `request`.
    pub fn build(&self, request: &GenerationRequest) -> Result<Prompt, minijinja::Error> {
        let text = match request {
            GenerationRequest::Template {
                project_type,
                artifact,
                details,
            } => self.render_template(project_type, artifact, details)?,
            GenerationRequest::PrReview { diff, language } => self.render(
                "pr_review",
                context! { language => language, diff => diff },
            )?,
            GenerationRequest::Docs { repo_summary } => {
                self.render("docs", context! { repo_summary => repo_summary })?
            }
            GenerationRequest::Chat { message } => format!("{CHAT_PREAMBLE}\nUser: {message}\n"),
        };
        debug!(kind = request.kind(), bytes = text.len(), "built prompt");
        Ok(Prompt::new(text))
    }

    fn render_template(
        &self,
        project_type: &str,
        artifact: &str,
        details: &Map<String, Value>,
    ) -> Result<String, minijinja::Error> {
        let artifact = artifact.to_lowercase();
        let (description, example) = match example_for(&artifact) {
            Some(entry) => (entry.description, entry.example),
            None => (NO_EXAMPLE_DESCRIPTION, ""),
        };
        self.render(
            "template",
            context! {
                artifact => artifact,
                project_type => project_type,
                details => render_details(details),
                description => description,
                example => example,
            },
        )
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String, minijinja::Error> {
        let template = self.env.get_template(name)?;
        template.render(ctx)
    }
}

/// Render details as `- key: value` lines, one per entry, in insertion order.
///
/// Strings are inserted verbatim; other JSON values use their compact JSON form.
pub fn render_details(details: &Map<String, Value>) -> String {
    details
        .iter()
        .map(|(key, value)| match value {
            Value::String(text) => format!("- {key}: {text}"),
            other => format!("- {key}: {other}"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
