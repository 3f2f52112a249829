//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use prbot::github::{CodeHost, GithubError};
use prbot::models::{ChangedFile, FileStatus, PullRequestRef, ReviewComment};
use prbot::providers::{CompletionProvider, ProviderError};

type Responder = Box<dyn Fn(&str, &str) -> Result<String, ProviderError> + Send + Sync>;

/// A provider that answers through a closure and remembers every call.
pub struct ScriptedProvider {
    respond: Responder,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedProvider {
    pub fn new(
        respond: impl Fn(&str, &str) -> Result<String, ProviderError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Replies with `reply` to every call.
    pub fn always(reply: &str) -> Self {
        let reply = reply.to_string();
        Self::new(move |_, _| Ok(reply.clone()))
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Calls made with the given system prompt.
    pub fn calls_with_system(&self, system: &str) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| s == system)
            .map(|(_, p)| p.clone())
            .collect()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), prompt.to_string()));
        (self.respond)(system, prompt)
    }
}

/// A code host serving a fixed file list and recording comments.
pub struct MemoryHost {
    files: Vec<ChangedFile>,
    head: String,
    reject_comments: bool,
    pub comments: Mutex<Vec<ReviewComment>>,
}

impl MemoryHost {
    pub fn new(files: Vec<ChangedFile>) -> Self {
        Self {
            files,
            head: "abc123".to_string(),
            reject_comments: false,
            comments: Mutex::new(Vec::new()),
        }
    }

    /// Every comment post fails with a 422.
    pub fn rejecting(mut self) -> Self {
        self.reject_comments = true;
        self
    }

    pub fn posted(&self) -> Vec<ReviewComment> {
        self.comments.lock().unwrap().clone()
    }
}

#[async_trait]
impl CodeHost for MemoryHost {
    async fn list_files(&self, _pr: &PullRequestRef) -> Result<Vec<ChangedFile>, GithubError> {
        Ok(self.files.clone())
    }

    async fn head_sha(&self, _pr: &PullRequestRef) -> Result<String, GithubError> {
        Ok(self.head.clone())
    }

    async fn create_review_comment(
        &self,
        _pr: &PullRequestRef,
        comment: &ReviewComment,
    ) -> Result<(), GithubError> {
        if self.reject_comments {
            return Err(GithubError::ApiError(
                "GitHub API returned 422: line must be part of the diff".into(),
            ));
        }
        self.comments.lock().unwrap().push(comment.clone());
        Ok(())
    }
}

pub fn pr() -> PullRequestRef {
    PullRequestRef {
        owner: "acme".into(),
        repo: "shop".into(),
        number: 7,
    }
}

pub fn changed(filename: &str, status: FileStatus, patch: Option<&str>) -> ChangedFile {
    ChangedFile {
        filename: filename.into(),
        status,
        patch: patch.map(str::to_string),
    }
}

/// Write `content` to `root/relative`, creating parent directories.
pub fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}
