//! Per-run statistics reported by both bots.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Summary statistics for a bot run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Files sent to the model.
    pub files_analyzed: usize,
    pub comments_posted: usize,
    pub comments_failed: usize,
    /// Review issues whose code could not be found in the patch.
    pub issues_unlocated: usize,
    /// Files whose model call failed after retries.
    pub files_failed: usize,
    /// Test files created or appended to in implement mode.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_files_written: Vec<PathBuf>,
}

impl RunSummary {
    /// Record the outcome of posting one comment.
    pub fn record_comment(&mut self, posted: bool) {
        if posted {
            self.comments_posted += 1;
        } else {
            self.comments_failed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_comment_counts_outcomes() {
        let mut s = RunSummary::default();
        s.record_comment(true);
        s.record_comment(true);
        s.record_comment(false);
        assert_eq!(s.comments_posted, 2);
        assert_eq!(s.comments_failed, 1);
    }

    #[test]
    fn empty_written_list_is_omitted() {
        let json = serde_json::to_value(RunSummary::default()).unwrap();
        assert!(json.get("test_files_written").is_none());
        assert_eq!(json["files_analyzed"], 0);
    }
}
