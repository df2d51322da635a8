//! Deterministic offline responder.
//!
//! Used both as the explicit `mock` provider and as the fallback when the live
//! provider fails. The prompt is classified by case-insensitive keyword
//! containment against an ordered rule table; the first matching rule wins.

/// Bumped whenever keywords, rule order or canned payloads change.
pub const MOCK_POLICY_VERSION: u32 = 1;

pub const MOCK_DOCKERFILE: &str = "FROM python:3.10-slim
WORKDIR /app
COPY . .
RUN pip install -r requirements.txt
CMD [\"uvicorn\", \"main:app\", \"--host\", \"0.0.0.0\", \"--port\", \"8000\"]";

pub const MOCK_CI_PIPELINE: &str = "name: CI
on: [push]
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v3
      - run: pip install -r requirements.txt
      - run: pytest";

pub const MOCK_REVIEW: &str = "Issue: Missing error handling.
Severity: Medium
Suggestion: Add try/except around risky operations.";

pub const MOCK_DEFAULT: &str = "MOCK: Generated fallback output";

/// One row of the classification table.
#[derive(Debug, Clone, Copy)]
pub struct MockRule {
    pub name: &'static str,
    /// Lowercase keywords; any one matching selects the rule.
    pub keywords: &'static [&'static str],
    pub response: &'static str,
}

/// Ordered classification table. Order is significant.
pub const MOCK_RULES: &[MockRule] = &[
    MockRule {
        name: "dockerfile",
        keywords: &["dockerfile"],
        response: MOCK_DOCKERFILE,
    },
    MockRule {
        name: "ci_pipeline",
        keywords: &["github actions", "ci/cd"],
        response: MOCK_CI_PIPELINE,
    },
    MockRule {
        name: "review",
        keywords: &["review"],
        response: MOCK_REVIEW,
    },
];

/// Return the first rule whose keywords occur in `prompt`, if any.
pub fn classify(prompt: &str) -> Option<&'static MockRule> {
    let lowered = prompt.to_lowercase();
    MOCK_RULES.iter().find(|rule| {
        rule.keywords
            .iter()
            .any(|keyword| lowered.contains(keyword))
    })
}

/// Canned response for `prompt`.
pub fn mock_response(prompt: &str) -> &'static str {
    classify(prompt).map_or(MOCK_DEFAULT, |rule| rule.response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dockerfile_keyword_is_case_insensitive() {
        assert_eq!(mock_response("Write a DOCKERFILE please"), MOCK_DOCKERFILE);
    }

    #[test]
    fn ci_keywords_select_pipeline() {
        assert_eq!(mock_response("set up GitHub Actions"), MOCK_CI_PIPELINE);
        assert_eq!(mock_response("improve our CI/CD"), MOCK_CI_PIPELINE);
    }

    #[test]
    fn review_keyword_selects_stub() {
        assert_eq!(mock_response("please review this diff"), MOCK_REVIEW);
    }

    #[test]
    fn unmatched_prompt_gets_default() {
        assert_eq!(mock_response("write a terraform module"), MOCK_DEFAULT);
        assert!(classify("").is_none());
    }

    /// Earlier rules win when several keywords are present.
    #[test]
    fn first_matching_rule_wins() {
        assert_eq!(
            mock_response("review this Dockerfile and the ci/cd setup"),
            MOCK_DOCKERFILE
        );
        assert_eq!(mock_response("review the github actions job"), MOCK_CI_PIPELINE);
    }

    #[test]
    fn rule_table_order_is_stable() {
        let names: Vec<&str> = MOCK_RULES.iter().map(|rule| rule.name).collect();
        assert_eq!(names, vec!["dockerfile", "ci_pipeline", "review"]);
        assert_eq!(MOCK_POLICY_VERSION, 1);
    }
}
