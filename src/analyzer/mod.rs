//! Code review bot: checks the added lines of a pull request against the
//! rule set and posts anchored review comments with suggested fixes.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::context::read_file_content;
use crate::diff::{locate, reformat};
use crate::filter::{IgnoreMatcher, load_ignore_patterns};
use crate::github::CodeHost;
use crate::models::{CodeReviewResult, PullRequestRef, ReviewComment, ReviewIssue, RunSummary};
use crate::output::review_comment_body;
use crate::pipeline::{
    FileUnderAnalysis, ModelJob, PipelineError, RunSettings, post_comment, run_model_jobs,
};
use crate::prompts::{REVIEW_SYSTEM_PROMPT, build_review_prompt};
use crate::providers::{CompletionProvider, parse_analysis};
use crate::rules::{Rule, load_rules};

/// Review run options.
#[derive(Debug, Clone)]
pub struct ReviewOptions {
    /// Checkout of the pull request's head, for rules and full file content.
    pub repo_root: PathBuf,
    /// Rules directory, relative to `repo_root` unless absolute.
    pub rules_path: PathBuf,
    /// Ignore-pattern file, relative to `repo_root` unless absolute.
    pub ignore_file: PathBuf,
    pub settings: RunSettings,
}

/// Runs the review pipeline for one pull request.
pub struct CodeAnalyzer {
    provider: Arc<dyn CompletionProvider>,
    options: ReviewOptions,
}

impl CodeAnalyzer {
    pub fn new(provider: Arc<dyn CompletionProvider>, options: ReviewOptions) -> Self {
        Self { provider, options }
    }

    /// Review `pr`, posting comments through `host`.
    ///
    /// Failures of individual model calls or comment posts are logged and
    /// counted; only rule loading and the code host's listing calls abort
    /// the run.
    pub async fn run(
        &self,
        host: &dyn CodeHost,
        pr: &PullRequestRef,
    ) -> Result<RunSummary, PipelineError> {
        let mut summary = RunSummary::default();
        let root = &self.options.repo_root;

        let rules_dir = root.join(&self.options.rules_path);
        let rules = load_rules(&rules_dir)?;
        if rules.is_empty() {
            info!(dir = %rules_dir.display(), "No rules found, nothing to review");
            return Ok(summary);
        }

        let patterns = load_ignore_patterns(&root.join(&self.options.ignore_file)).await;
        let matcher = IgnoreMatcher::new(&patterns);

        info!(pr = %pr, "processing pull request");
        let files = host.list_files(pr).await?;
        let selected: Vec<FileUnderAnalysis> = files
            .into_iter()
            .filter(|file| {
                let ignored = matcher.is_ignored(&file.filename);
                if ignored {
                    info!(file = %file.filename, "skipping ignored file");
                }
                !ignored
            })
            .filter_map(FileUnderAnalysis::from_changed)
            .collect();

        if selected.is_empty() {
            info!("no files to review");
            return Ok(summary);
        }

        let commit_id = host.head_sha(pr).await?;
        debug!(commit = %commit_id, "using head commit");

        let jobs = self.build_jobs(&rules, &selected).await;
        let replies = run_model_jobs(Arc::clone(&self.provider), jobs, self.options.settings).await;

        for (file, reply) in selected.iter().zip(replies) {
            let text = match reply {
                Ok(text) => text,
                Err(e) => {
                    warn!(file = %file.filename(), error = %e, "model call failed, skipping file");
                    summary.files_failed += 1;
                    continue;
                }
            };
            summary.files_analyzed += 1;

            let analysis: CodeReviewResult = parse_analysis(&text);
            info!(
                file = %file.filename(),
                issues = analysis.issues.len(),
                "analysis complete"
            );

            for issue in &analysis.issues {
                let Some(comment) = review_comment(file, issue, &commit_id) else {
                    info!(
                        file = %file.filename(),
                        rule = %issue.rule_id,
                        "could not find line numbers for issue"
                    );
                    summary.issues_unlocated += 1;
                    continue;
                };
                post_comment(host, pr, &comment, &mut summary).await;
            }
        }

        info!(
            analyzed = summary.files_analyzed,
            posted = summary.comments_posted,
            failed = summary.comments_failed,
            unlocated = summary.issues_unlocated,
            "code review completed"
        );
        Ok(summary)
    }

    async fn build_jobs(&self, rules: &[Rule], files: &[FileUnderAnalysis]) -> Vec<ModelJob> {
        let mut jobs = Vec::with_capacity(files.len());
        for file in files {
            info!(
                file = %file.filename(),
                added_lines = file.added_lines.len(),
                "analyzing"
            );
            let content = read_file_content(&self.options.repo_root, file.filename()).await;
            jobs.push(ModelJob {
                system: REVIEW_SYSTEM_PROMPT,
                prompt: build_review_prompt(rules, &file.added_code(), content.as_deref()),
            });
        }
        jobs
    }
}

/// Anchor `issue` on the patch of `file`, or `None` if its code is not
/// among the added lines.
fn review_comment(
    file: &FileUnderAnalysis,
    issue: &ReviewIssue,
    commit_id: &str,
) -> Option<ReviewComment> {
    let location = locate(file.patch(), Some(&issue.code));
    let (start, end) = location.range()?;
    let suggestion = reformat(issue.suggestion.as_deref(), location.indentation.as_deref());
    let body = review_comment_body(issue, suggestion.as_deref());
    Some(ReviewComment::anchored(
        file.filename(),
        commit_id,
        body,
        start,
        end,
    ))
}
