//! Typed model replies, one per call site.
//!
//! Each result type is `Default`, which doubles as the fallback when a
//! reply cannot be parsed. After parsing, [`AnalysisResult::validated`]
//! drops entries that are missing the fields the pipeline relies on.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Common behaviour for model replies parsed from JSON.
pub trait AnalysisResult: DeserializeOwned + Default {
    /// Drop entries the pipeline cannot act on.
    fn validated(self) -> Self;

    /// Number of usable entries.
    fn len(&self) -> usize;

    /// Whether the reply carried no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A rule violation reported by the review model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewIssue {
    /// Identifier of the violated rule (the rule file's stem).
    #[serde(default)]
    pub rule_id: String,
    /// The offending code as echoed by the model.
    #[serde(default)]
    pub code: String,
    /// Why the code violates the rule.
    #[serde(default)]
    pub explanation: String,
    /// Replacement code, if the model proposed one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Reply shape of the code review call: `{"issues": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeReviewResult {
    #[serde(default)]
    pub issues: Vec<ReviewIssue>,
}

impl AnalysisResult for CodeReviewResult {
    fn validated(mut self) -> Self {
        self.issues.retain(|issue| !issue.code.trim().is_empty());
        self
    }

    fn len(&self) -> usize {
        self.issues.len()
    }
}

/// A test the model suggests adding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSuggestion {
    /// Function or block the test exercises.
    #[serde(default)]
    pub target: String,
    /// Why it is worth testing.
    #[serde(default)]
    pub explanation: String,
    /// Proposed test implementation.
    #[serde(default)]
    pub test_code: String,
}

/// Reply shape of the test suggestion call: `{"suggestions": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSuggestionResult {
    #[serde(default)]
    pub suggestions: Vec<TestSuggestion>,
}

impl AnalysisResult for TestSuggestionResult {
    fn validated(mut self) -> Self {
        self.suggestions
            .retain(|s| !s.test_code.trim().is_empty());
        self
    }

    fn len(&self) -> usize {
        self.suggestions.len()
    }
}

/// Test code the model wrote for a specific test file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedTest {
    /// Repo-relative path of the test file the code belongs in.
    #[serde(default)]
    pub file: String,
    /// Test source to append.
    #[serde(default)]
    pub test_code: String,
}

/// Reply shape of the test implementation call: `{"tests": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestImplementationResult {
    #[serde(default)]
    pub tests: Vec<GeneratedTest>,
}

impl AnalysisResult for TestImplementationResult {
    fn validated(mut self) -> Self {
        self.tests.retain(|t| !t.test_code.trim().is_empty());
        self
    }

    fn len(&self) -> usize {
        self.tests.len()
    }
}

/// A source file paired with the test file that covers it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestFileMapping {
    pub source: String,
    pub test_file: String,
}

/// Reply shape of the test-file mapping call: `{"mappings": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestMappingResult {
    #[serde(default)]
    pub mappings: Vec<TestFileMapping>,
}

impl AnalysisResult for TestMappingResult {
    fn validated(mut self) -> Self {
        self.mappings
            .retain(|m| !m.source.trim().is_empty() && !m.test_file.trim().is_empty());
        self
    }

    fn len(&self) -> usize {
        self.mappings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_issue_tolerates_missing_suggestion() {
        let json = r#"{"issues":[{"rule_id":"no-var","code":"var x = 1;","explanation":"use let"}]}"#;
        let result: CodeReviewResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].suggestion, None);
    }

    #[test]
    fn validated_drops_issues_without_code() {
        let result = CodeReviewResult {
            issues: vec![
                ReviewIssue {
                    rule_id: "a".into(),
                    code: "   ".into(),
                    explanation: "e".into(),
                    suggestion: None,
                },
                ReviewIssue {
                    rule_id: "b".into(),
                    code: "x()".into(),
                    explanation: "e".into(),
                    suggestion: None,
                },
            ],
        }
        .validated();
        assert_eq!(result.len(), 1);
        assert_eq!(result.issues[0].rule_id, "b");
    }

    #[test]
    fn missing_array_defaults_to_empty() {
        let result: TestSuggestionResult = serde_json::from_str("{}").unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn validated_drops_empty_test_code() {
        let result = TestImplementationResult {
            tests: vec![GeneratedTest {
                file: "test/a_test.exs".into(),
                test_code: "\n".into(),
            }],
        }
        .validated();
        assert!(result.is_empty());
    }

    #[test]
    fn validated_drops_incomplete_mappings() {
        let result = TestMappingResult {
            mappings: vec![
                TestFileMapping {
                    source: "lib/a.ex".into(),
                    test_file: "".into(),
                },
                TestFileMapping {
                    source: "lib/b.ex".into(),
                    test_file: "test/b_test.exs".into(),
                },
            ],
        }
        .validated();
        assert_eq!(result.len(), 1);
    }
}
