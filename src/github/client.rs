//! GitHub REST API client.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::constants;
use crate::models::{ChangedFile, PullRequestRef, ReviewComment};

use super::{CodeHost, GithubError};

/// Page size for paginated endpoints (GitHub's maximum).
const PER_PAGE: usize = 100;

/// GitHub stops listing pull request files after this many pages.
const MAX_PAGES: usize = 30;

/// GitHub API client authenticated with a token.
pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

#[derive(Deserialize)]
struct PullRequestHead {
    sha: String,
}

#[derive(Deserialize)]
struct PullRequestResponse {
    head: PullRequestHead,
}

impl GithubClient {
    /// Create a client for the API at `api_url` (e.g. `https://api.github.com`).
    pub fn new(api_url: &str, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn pull_url(&self, pr: &PullRequestRef) -> String {
        format!(
            "{}/repos/{}/{}/pulls/{}",
            self.api_url, pr.owner, pr.repo, pr.number
        )
    }

    fn files_url(&self, pr: &PullRequestRef, page: usize) -> String {
        format!(
            "{}/files?per_page={PER_PAGE}&page={page}",
            self.pull_url(pr)
        )
    }

    fn comments_url(&self, pr: &PullRequestRef) -> String {
        format!("{}/comments", self.pull_url(pr))
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", constants::GITHUB_API_VERSION)
            .header(
                "User-Agent",
                format!("{}/{}", constants::APP_NAME, constants::VERSION),
            )
    }

    /// Send a request and fail on non-2xx responses.
    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<reqwest::Response, GithubError> {
        let response = builder
            .send()
            .await
            .map_err(|e| GithubError::ApiError(format!("{what}: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(GithubError::ApiError(format!(
                "{what} failed with HTTP {status}: {body}"
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl CodeHost for GithubClient {
    async fn list_files(&self, pr: &PullRequestRef) -> Result<Vec<ChangedFile>, GithubError> {
        let mut files = Vec::new();
        for page in 1..=MAX_PAGES {
            let url = self.files_url(pr, page);
            let response = self
                .send(self.request(reqwest::Method::GET, &url), "listing files")
                .await?;
            let batch: Vec<ChangedFile> = response
                .json()
                .await
                .map_err(|e| GithubError::ApiError(format!("invalid files response: {e}")))?;

            let done = batch.len() < PER_PAGE;
            files.extend(batch);
            if done {
                break;
            }
        }
        debug!(pr = %pr, count = files.len(), "listed changed files");
        Ok(files)
    }

    async fn head_sha(&self, pr: &PullRequestRef) -> Result<String, GithubError> {
        let url = self.pull_url(pr);
        let response = self
            .send(self.request(reqwest::Method::GET, &url), "fetching pull request")
            .await?;
        let pull: PullRequestResponse = response
            .json()
            .await
            .map_err(|e| GithubError::ApiError(format!("invalid pull request response: {e}")))?;
        Ok(pull.head.sha)
    }

    async fn create_review_comment(
        &self,
        pr: &PullRequestRef,
        comment: &ReviewComment,
    ) -> Result<(), GithubError> {
        let url = self.comments_url(pr);
        self.send(
            self.request(reqwest::Method::POST, &url).json(comment),
            "creating review comment",
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pr() -> PullRequestRef {
        PullRequestRef {
            owner: "acme".into(),
            repo: "shop".into(),
            number: 7,
        }
    }

    #[test]
    fn urls_follow_rest_layout() {
        let client = GithubClient::new("https://api.github.com/", "t");
        assert_eq!(
            client.pull_url(&pr()),
            "https://api.github.com/repos/acme/shop/pulls/7"
        );
        assert_eq!(
            client.files_url(&pr(), 2),
            "https://api.github.com/repos/acme/shop/pulls/7/files?per_page=100&page=2"
        );
        assert_eq!(
            client.comments_url(&pr()),
            "https://api.github.com/repos/acme/shop/pulls/7/comments"
        );
    }

    #[test]
    fn enterprise_api_url() {
        let client = GithubClient::new("https://ghe.example.com/api/v3", "t");
        assert_eq!(
            client.pull_url(&pr()),
            "https://ghe.example.com/api/v3/repos/acme/shop/pulls/7"
        );
    }

    #[test]
    fn request_carries_auth_and_version_headers() {
        let client = GithubClient::new("https://api.github.com", "ghp_x");
        let request = client
            .request(reqwest::Method::GET, "https://api.github.com/x")
            .build()
            .unwrap();
        let headers = request.headers();
        assert_eq!(headers["Authorization"], "Bearer ghp_x");
        assert_eq!(headers["X-GitHub-Api-Version"], "2022-11-28");
        assert_eq!(headers["Accept"], "application/vnd.github+json");
    }

    #[test]
    fn pull_response_exposes_head_sha() {
        let json = r#"{"number":7,"head":{"sha":"abc123","ref":"feature"}}"#;
        let pull: PullRequestResponse = serde_json::from_str(json).unwrap();
        assert_eq!(pull.head.sha, "abc123");
    }
}
