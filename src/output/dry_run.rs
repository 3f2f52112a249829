//! Code host wrapper that records comments instead of posting them.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use crate::github::{CodeHost, GithubError};
use crate::models::{ChangedFile, PullRequestRef, ReviewComment};

/// Delegates reads to `inner`; comment creation is captured in memory.
pub struct DryRunHost<'a> {
    inner: &'a dyn CodeHost,
    recorded: Mutex<Vec<ReviewComment>>,
}

impl<'a> DryRunHost<'a> {
    pub fn new(inner: &'a dyn CodeHost) -> Self {
        Self {
            inner,
            recorded: Mutex::new(Vec::new()),
        }
    }

    /// Comments that would have been posted, in posting order.
    pub fn into_comments(self) -> Vec<ReviewComment> {
        self.recorded.into_inner()
    }
}

#[async_trait]
impl CodeHost for DryRunHost<'_> {
    async fn list_files(&self, pr: &PullRequestRef) -> Result<Vec<ChangedFile>, GithubError> {
        self.inner.list_files(pr).await
    }

    async fn head_sha(&self, pr: &PullRequestRef) -> Result<String, GithubError> {
        self.inner.head_sha(pr).await
    }

    async fn create_review_comment(
        &self,
        _pr: &PullRequestRef,
        comment: &ReviewComment,
    ) -> Result<(), GithubError> {
        info!(file = %comment.path, line = comment.line, "dry run: comment not posted");
        self.recorded.lock().await.push(comment.clone());
        Ok(())
    }
}
