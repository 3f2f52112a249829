//! Code host integration: listing changed files and posting review comments.
//!
//! The pipelines only talk to the [`CodeHost`] trait. [`GithubClient`]
//! implements it over the GitHub REST API; tests supply in-memory hosts.

pub mod client;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::constants;
use crate::env::Env;
use crate::models::{ChangedFile, PullRequestRef, ReviewComment};

pub use client::GithubClient;

/// Errors from code host calls and pull request resolution.
#[derive(Error, Debug)]
pub enum GithubError {
    #[error("invalid repository '{0}', expected OWNER/REPO")]
    InvalidRepository(String),

    #[error("invalid pull request number: {0}")]
    InvalidPrNumber(String),

    #[error(
        "could not determine the pull request; pass --repo and --pr or set GITHUB_OWNER, GITHUB_REPO and PR_NUMBER"
    )]
    Unresolved,

    #[error("failed to read event payload {path}: {message}")]
    EventPayload { path: String, message: String },

    #[error("API request failed: {0}")]
    ApiError(String),
}

/// Pull request operations the bots need from a code host.
#[async_trait]
pub trait CodeHost: Send + Sync {
    /// All files changed by the pull request.
    async fn list_files(&self, pr: &PullRequestRef) -> Result<Vec<ChangedFile>, GithubError>;

    /// SHA of the pull request's head commit.
    async fn head_sha(&self, pr: &PullRequestRef) -> Result<String, GithubError>;

    /// Post a line- or range-anchored review comment.
    async fn create_review_comment(
        &self,
        pr: &PullRequestRef,
        comment: &ReviewComment,
    ) -> Result<(), GithubError>;
}

impl PullRequestRef {
    /// Determine the pull request to work on.
    ///
    /// Sources in priority order:
    /// 1. `cli_repo` (`OWNER/REPO`) and `cli_pr`
    /// 2. `GITHUB_REPOSITORY` and `pull_request.number` from the event
    ///    payload at `GITHUB_EVENT_PATH` (GitHub Actions)
    /// 3. `GITHUB_OWNER`, `GITHUB_REPO` and `PR_NUMBER`
    ///
    /// Repository and number are resolved independently, so a CLI `--pr`
    /// can be combined with the repository of the Actions environment.
    pub fn resolve(
        env: &Env,
        cli_repo: Option<&str>,
        cli_pr: Option<u64>,
    ) -> Result<Self, GithubError> {
        let (owner, repo) = match cli_repo {
            Some(slug) => split_repository(slug)?,
            None => match env.non_empty(constants::ENV_GITHUB_REPOSITORY) {
                Some(slug) => split_repository(&slug)?,
                None => match (
                    env.non_empty(constants::ENV_GITHUB_OWNER),
                    env.non_empty(constants::ENV_GITHUB_REPO),
                ) {
                    (Some(owner), Some(repo)) => (owner, repo),
                    _ => return Err(GithubError::Unresolved),
                },
            },
        };

        let number = match cli_pr {
            Some(n) => n,
            None => match event_pr_number(env)? {
                Some(n) => n,
                None => {
                    let raw = env
                        .non_empty(constants::ENV_PR_NUMBER)
                        .ok_or(GithubError::Unresolved)?;
                    raw.trim()
                        .parse()
                        .map_err(|_| GithubError::InvalidPrNumber(raw.clone()))?
                }
            },
        };

        Ok(Self {
            owner,
            repo,
            number,
        })
    }
}

/// Split `OWNER/REPO`.
fn split_repository(slug: &str) -> Result<(String, String), GithubError> {
    match slug.trim().split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(GithubError::InvalidRepository(slug.to_string())),
    }
}

/// Pull request number from the Actions event payload, if there is one.
fn event_pr_number(env: &Env) -> Result<Option<u64>, GithubError> {
    let Some(path) = env.non_empty(constants::ENV_GITHUB_EVENT_PATH) else {
        return Ok(None);
    };
    read_event_pr_number(Path::new(&path))
}

fn read_event_pr_number(path: &Path) -> Result<Option<u64>, GithubError> {
    let payload_err = |message: String| GithubError::EventPayload {
        path: path.display().to_string(),
        message,
    };
    let content = std::fs::read_to_string(path).map_err(|e| payload_err(e.to_string()))?;
    let event: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| payload_err(e.to_string()))?;
    Ok(event
        .get("pull_request")
        .and_then(|pr| pr.get("number"))
        .and_then(serde_json::Value::as_u64))
}
