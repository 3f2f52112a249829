//! Markdown bodies of the comments posted on pull requests.

use crate::models::{ReviewIssue, TestSuggestion};

/// Body of a review comment for `issue`.
///
/// `suggestion` is the replacement code after re-indentation; GitHub
/// renders the ```` ```suggestion ```` block as an applicable change. An
/// empty block proposes deleting the anchored lines.
pub fn review_comment_body(issue: &ReviewIssue, suggestion: Option<&str>) -> String {
    format!(
        "## AI Code Review: {rule}\n\n{explanation}\n\n### Suggestion:\n```suggestion\n{suggestion}\n```\n\n[View rule]({rule}.md)",
        rule = issue.rule_id,
        explanation = issue.explanation,
        suggestion = suggestion.unwrap_or_default(),
    )
}

/// Body of a test suggestion comment, with the test fenced as `language`.
pub fn test_suggestion_body(suggestion: &TestSuggestion, language: &str) -> String {
    format!(
        "## AI Test Suggestion for: {}\n\n{}\n\n### Suggested Test:\n```{language}\n{}\n```\n",
        suggestion.target, suggestion.explanation, suggestion.test_code,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn issue() -> ReviewIssue {
        ReviewIssue {
            rule_id: "no-io-puts".into(),
            code: "IO.puts(x)".into(),
            explanation: "Use Logger in production code.".into(),
            suggestion: Some("Logger.info(x)".into()),
        }
    }

    #[test]
    fn review_body_layout() {
        let body = review_comment_body(&issue(), Some("    Logger.info(x)"));
        assert_eq!(
            body,
            "## AI Code Review: no-io-puts\n\nUse Logger in production code.\n\n### Suggestion:\n```suggestion\n    Logger.info(x)\n```\n\n[View rule](no-io-puts.md)"
        );
    }

    #[test]
    fn review_body_without_suggestion_has_empty_block() {
        let body = review_comment_body(&issue(), None);
        assert!(body.contains("```suggestion\n\n```"));
    }

    #[test]
    fn test_suggestion_layout() {
        let s = TestSuggestion {
            target: "App.add/2".into(),
            explanation: "Uncovered branch.".into(),
            test_code: "test \"adds\" do\n  assert App.add(1, 2) == 3\nend".into(),
        };
        let body = test_suggestion_body(&s, "elixir");
        assert!(body.starts_with("## AI Test Suggestion for: App.add/2\n\nUncovered branch.\n\n"));
        assert!(body.contains("### Suggested Test:\n```elixir\ntest \"adds\" do"));
        assert!(body.ends_with("end\n```\n"));
    }
}
