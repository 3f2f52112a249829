//! Shared plumbing for the review and test-writer pipelines.
//!
//! Model calls for different files run concurrently, bounded by a
//! semaphore. Results come back in input order so comments are posted in
//! file order regardless of which call finished first.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::diff::extract_added_lines;
use crate::github::{CodeHost, GithubError};
use crate::models::{ChangedFile, PullRequestRef, ReviewComment, RunSummary};
use crate::providers::{CompletionProvider, ProviderError, RetryPolicy, complete_with_retry};
use crate::rules::RulesError;

/// Errors that abort a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("code host error: {0}")]
    Host(#[from] GithubError),

    #[error("failed to load rules: {0}")]
    Rules(#[from] RulesError),
}

/// Settings shared by both pipelines.
#[derive(Debug, Clone, Copy)]
pub struct RunSettings {
    /// Max model calls in flight.
    pub max_concurrent: usize,
    pub retry: RetryPolicy,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            max_concurrent: 1,
            retry: RetryPolicy::default(),
        }
    }
}

/// A changed file selected for analysis.
#[derive(Debug, Clone)]
pub struct FileUnderAnalysis {
    pub file: ChangedFile,
    pub added_lines: Vec<String>,
}

impl FileUnderAnalysis {
    /// Build from a changed file; `None` for removed files and files without
    /// added lines.
    pub fn from_changed(file: ChangedFile) -> Option<Self> {
        if file.is_removed() {
            debug!(file = %file.filename, "skipping removed file");
            return None;
        }
        let added_lines = extract_added_lines(file.patch.as_deref());
        if added_lines.is_empty() {
            debug!(file = %file.filename, "skipping file without added lines");
            return None;
        }
        Some(Self { file, added_lines })
    }

    pub fn filename(&self) -> &str {
        &self.file.filename
    }

    pub fn patch(&self) -> Option<&str> {
        self.file.patch.as_deref()
    }

    /// Added lines joined for the prompt.
    pub fn added_code(&self) -> String {
        self.added_lines.join("\n")
    }
}

/// One model call to make.
#[derive(Debug, Clone)]
pub struct ModelJob {
    pub system: &'static str,
    pub prompt: String,
}

/// Run `jobs` against `provider` with bounded concurrency.
///
/// The returned vector is index-aligned with `jobs`. A job whose task
/// panicked reports an `ApiError`.
pub async fn run_model_jobs(
    provider: Arc<dyn CompletionProvider>,
    jobs: Vec<ModelJob>,
    settings: RunSettings,
) -> Vec<Result<String, ProviderError>> {
    let total = jobs.len();
    let semaphore = Arc::new(Semaphore::new(settings.max_concurrent.max(1)));
    let mut join_set = JoinSet::new();

    for (index, job) in jobs.into_iter().enumerate() {
        let provider = Arc::clone(&provider);
        let sem = Arc::clone(&semaphore);
        let retry = settings.retry;

        join_set.spawn(async move {
            let Ok(_permit) = sem.acquire().await else {
                return (index, Err(ProviderError::ApiError("semaphore closed".into())));
            };
            let result = complete_with_retry(provider.as_ref(), job.system, &job.prompt, retry).await;
            (index, result)
        });
    }

    let mut results: Vec<Option<Result<String, ProviderError>>> =
        (0..total).map(|_| None).collect();
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((index, result)) => results[index] = Some(result),
            Err(e) => warn!(error = %e, "model task panicked"),
        }
    }

    results
        .into_iter()
        .map(|r| r.unwrap_or_else(|| Err(ProviderError::ApiError("model task panicked".into()))))
        .collect()
}

/// Post one comment, recording the outcome.
pub async fn post_comment(
    host: &dyn CodeHost,
    pr: &PullRequestRef,
    comment: &ReviewComment,
    summary: &mut RunSummary,
) {
    match host.create_review_comment(pr, comment).await {
        Ok(()) => {
            info!(
                file = %comment.path,
                start_line = comment.start_line.unwrap_or(comment.line),
                line = comment.line,
                "posted comment"
            );
            summary.record_comment(true);
        }
        Err(e) => {
            warn!(file = %comment.path, line = comment.line, error = %e, "error posting comment");
            summary.record_comment(false);
        }
    }
}
