//! Pull request types exchanged with the code-hosting API.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Status of a file in a pull request, as reported by GitHub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
    Copied,
    Changed,
    Unchanged,
    #[serde(other)]
    Unknown,
}

/// One changed file of a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Repo-relative path in the head revision.
    pub filename: String,
    pub status: FileStatus,
    /// Unified-diff text for this file. Absent for binary or very large files.
    #[serde(default)]
    pub patch: Option<String>,
}

impl ChangedFile {
    /// Whether the file was deleted by the pull request.
    pub fn is_removed(&self) -> bool {
        self.status == FileStatus::Removed
    }
}

/// Identifies a pull request on the code host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// A line- or range-anchored review comment ready to post.
///
/// Serializes to the body of GitHub's "create review comment" call;
/// `start_line` is only present for multi-line ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewComment {
    pub path: String,
    pub commit_id: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u32>,
    pub line: u32,
}

impl ReviewComment {
    /// Build a comment anchored on `start..=end`, collapsing to a single
    /// line when both ends are equal.
    pub fn anchored(
        path: impl Into<String>,
        commit_id: impl Into<String>,
        body: impl Into<String>,
        start: u32,
        end: u32,
    ) -> Self {
        Self {
            path: path.into(),
            commit_id: commit_id.into(),
            body: body.into(),
            start_line: (start != end).then_some(start),
            line: end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_comment_omits_start_line() {
        let c = ReviewComment::anchored("a.ex", "sha", "body", 4, 4);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["line"], 4);
        assert!(json.get("start_line").is_none());
    }

    #[test]
    fn range_comment_carries_start_line() {
        let c = ReviewComment::anchored("a.ex", "sha", "body", 2, 5);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["start_line"], 2);
        assert_eq!(json["line"], 5);
        assert_eq!(json["commit_id"], "sha");
    }

    #[test]
    fn changed_file_parses_github_shape() {
        let json = r#"{"sha":"abc","filename":"lib/a.ex","status":"removed","additions":0}"#;
        let file: ChangedFile = serde_json::from_str(json).unwrap();
        assert!(file.is_removed());
        assert_eq!(file.patch, None);
    }

    #[test]
    fn unknown_status_is_tolerated() {
        let json = r#"{"filename":"x","status":"something-new","patch":"@@ -1 +1 @@"}"#;
        let file: ChangedFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.status, FileStatus::Unknown);
    }

    #[test]
    fn pull_request_ref_display() {
        let pr = PullRequestRef {
            owner: "acme".into(),
            repo: "shop".into(),
            number: 12,
        };
        assert_eq!(pr.to_string(), "acme/shop#12");
    }
}
