//! Prompt assembly for the review, test-writing and test-mapping calls.

use std::fmt::Write as _;

use crate::coverage::FileCoverage;
use crate::rules::Rule;

/// System prompt of the review bot.
pub const REVIEW_SYSTEM_PROMPT: &str = "You are an expert software engineer that identifies violations of coding rules and suggests fixes.";

/// System prompt of the test writer bot.
pub const TEST_SYSTEM_PROMPT: &str =
    "You are a test writing assistant that helps developers improve their test coverage.";

/// System prompt for mapping source files to test files.
pub const MAPPING_SYSTEM_PROMPT: &str =
    "You are an expert software engineer who knows where projects keep their unit tests.";

const REVIEW_INSTRUCTIONS: &str = r#"IMPORTANT: Only analyze the code shown in the "Code to analyze" section, which represents newly added lines in a pull request. Focus exclusively on these lines when identifying rule violations. The full file context is provided only for reference to understand the surrounding code when providing the suggestion.

Analyze the code and identify any violations of the rules. For each violation:
1. Carefully identify the specific rule that was violated. If the rule was not provided above then ignore the violation
2. Explain why it violates the rule
3. Include the exact problematic code snippet that violates the rule
4. Suggest a specific code change to fix the issue but only if it changes the code in meaningful way. Do NOT create suggestions that would leave the code the same as before. If the suggestion is to remove the code, provide none.

Format your response as JSON:
{
  "issues": [
    {
      "rule_id": "rule-id",
      "code": "the exact problematic code snippet",
      "explanation": "why this violates the rule",
      "suggestion": "(whitespaces as in the reference) suggested code fix"
    }
  ]
}

If no issues are found, return {"issues": []}."#;

const SUGGESTION_INSTRUCTIONS: &str = r#"Analyze the code and suggest tests that would improve coverage. For each suggestion:
1. Identify the specific function or code block that needs testing
2. Explain why testing this is important
3. Provide a specific test case implementation that would test this code
4. Make sure the test follows best practices and is well-structured

Format your response as JSON:
{
  "suggestions": [
    {
      "target": "name of function or code block to test",
      "explanation": "why this needs testing",
      "test_code": "suggested test implementation"
    }
  ]
}

If no test suggestions are needed, return {"suggestions": []}."#;

const IMPLEMENTATION_INSTRUCTIONS: &str = r#"Write tests that cover the changed code, focusing on the uncovered lines. The test code will be appended to the test file named above (or become its initial content if it does not exist yet), so:
1. Do not repeat tests that already exist in the current test file
2. If the file does not exist yet, include the complete module boilerplate
3. If the file exists, return only the new test cases that fit inside it
4. Follow the conventions of the existing tests

Format your response as JSON:
{
  "tests": [
    {
      "file": "path/to/test_file",
      "test_code": "test code to add"
    }
  ]
}

If no tests are needed, return {"tests": []}."#;

const MAPPING_INSTRUCTIONS: &str = r#"For each source file, name the test file that should hold its unit tests. Prefer an existing test file from the repository tree; otherwise propose a path that follows the repository's conventions.

Format your response as JSON:
{
  "mappings": [
    {
      "source": "path/to/source_file",
      "test_file": "path/to/test_file"
    }
  ]
}"#;

/// Inputs shared by the test writer prompts.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestPromptContext<'a> {
    /// Added lines of the change, newline-joined.
    pub code: &'a str,
    pub full_file: Option<&'a str>,
    pub coverage: Option<&'a FileCoverage>,
    pub uncovered: &'a [u32],
}

/// Build the review prompt for `code` (the added lines of one file).
pub fn build_review_prompt(rules: &[Rule], code: &str, full_file: Option<&str>) -> String {
    let rules_text = rules
        .iter()
        .map(|rule| format!("## {}\n{}", rule.title, rule.content))
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut prompt = String::new();
    prompt.push_str(
        "You are an expert and careful software engineer checking if code follows specific rules.\n\n",
    );
    let _ = writeln!(prompt, "# Rules to check:\n{rules_text}\n");
    let _ = writeln!(prompt, "# Code to analyze (newly added lines):\n```\n{code}\n```\n");
    if let Some(full) = full_file.filter(|f| !f.is_empty()) {
        let _ = writeln!(
            prompt,
            "# Full file context (for reference only):\n```\n{full}\n```\n"
        );
    }
    prompt.push_str(REVIEW_INSTRUCTIONS);
    prompt
}

/// Build the prompt asking for test suggestions to post as comments.
pub fn build_test_suggestion_prompt(ctx: &TestPromptContext<'_>) -> String {
    let mut prompt = String::from(
        "You are a test writing assistant that helps developers improve their test coverage.\n\n",
    );
    push_test_context(&mut prompt, ctx);
    prompt.push_str(SUGGESTION_INSTRUCTIONS);
    prompt
}

/// Build the prompt asking for test code to write into `test_file`.
pub fn build_test_implementation_prompt(
    ctx: &TestPromptContext<'_>,
    source_file: &str,
    test_file: &str,
    existing_test: Option<&str>,
) -> String {
    let mut prompt = String::from(
        "You are a test writing assistant that implements unit tests for changed code.\n\n",
    );
    let _ = writeln!(prompt, "# Source file: {source_file}\n");
    push_test_context(&mut prompt, ctx);
    let _ = writeln!(prompt, "\n# Target test file: {test_file}\n");
    match existing_test {
        Some(existing) => {
            let _ = writeln!(prompt, "# Current test file content:\n```\n{existing}\n```\n");
        }
        None => prompt.push_str("# The test file does not exist yet.\n\n"),
    }
    prompt.push_str(IMPLEMENTATION_INSTRUCTIONS);
    prompt
}

/// Build the prompt asking which test file belongs to each source file.
pub fn build_mapping_prompt<S: AsRef<str>>(sources: &[S], tree: &[String]) -> String {
    let mut prompt = String::from("# Source files:\n");
    for source in sources {
        let _ = writeln!(prompt, "- {}", source.as_ref());
    }
    prompt.push_str("\n# Repository tree:\n```\n");
    for path in tree {
        let _ = writeln!(prompt, "{path}");
    }
    prompt.push_str("```\n\n");
    prompt.push_str(MAPPING_INSTRUCTIONS);
    prompt
}

fn push_test_context(prompt: &mut String, ctx: &TestPromptContext<'_>) {
    if let Some(full) = ctx.full_file.filter(|f| !f.is_empty()) {
        let _ = writeln!(prompt, "# Full file content for context:\n```\n{full}\n```\n");
    }
    let _ = writeln!(prompt, "# Code changes to analyze:\n```\n{}\n```\n", ctx.code);

    match ctx.coverage {
        Some(coverage) => {
            let json = serde_json::to_string_pretty(coverage).unwrap_or_default();
            let _ = writeln!(prompt, "# Current coverage data:\n```json\n{json}\n```\n");
            let uncovered = if ctx.uncovered.is_empty() {
                "None detected".to_string()
            } else {
                ctx.uncovered
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            let _ = writeln!(prompt, "# Uncovered lines:\n{uncovered}\n");
        }
        None => prompt.push_str("# No coverage data available for this file.\n\n"),
    }
}
