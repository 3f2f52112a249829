//! JSON rendering of a run.
//!
//! Outputs `{"pull_request": "...", "comments": [...], "summary": {...}}`.

use crate::models::{PullRequestRef, ReviewComment, RunSummary};

/// Render the comments of a run (posted or captured) and its summary.
pub fn render_run(pr: &PullRequestRef, comments: &[ReviewComment], summary: &RunSummary) -> String {
    let output = serde_json::json!({
        "pull_request": pr.to_string(),
        "comments": comments,
        "summary": summary,
    });

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}
