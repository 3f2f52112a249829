//! Repository context handed to the model alongside the diff.
//!
//! Full file contents give the model the surrounding code of the added
//! lines. The file listing feeds source-to-test mapping.

use std::path::{Component, Path, PathBuf};

use ignore::WalkBuilder;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors while reading repository files.
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("path escapes the repository root: {0}")]
    OutsideRoot(String),

    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Join `relative` onto `root`.
///
/// Absolute paths and `..` components are rejected; file names come from
/// the code host and the model, and are not trusted.
pub fn resolve_in_root(root: &Path, relative: &str) -> Result<PathBuf, ContextError> {
    let rel = Path::new(relative);
    let escapes = rel
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes || relative.trim().is_empty() {
        return Err(ContextError::OutsideRoot(relative.to_string()));
    }
    Ok(root.join(rel))
}

/// Read `relative` below `root`.
pub async fn read_file(root: &Path, relative: &str) -> Result<String, ContextError> {
    let path = resolve_in_root(root, relative)?;
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| ContextError::ReadFile { path, source: e })
}

/// Full text of a changed file, or `None` when it cannot be read.
pub async fn read_file_content(root: &Path, relative: &str) -> Option<String> {
    match read_file(root, relative).await {
        Ok(content) => {
            debug!(file = relative, chars = content.len(), "read full file content");
            Some(content)
        }
        Err(e) => {
            warn!(file = relative, error = %e, "could not read full file content");
            None
        }
    }
}

/// Repo-relative paths of all files below `root`, `/`-separated and sorted.
///
/// Hidden files and paths excluded by `.gitignore` are skipped.
pub fn list_repository_files(root: &Path) -> Vec<String> {
    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .require_git(false)
        .build();

    let mut files: Vec<String> = walker
        .flatten()
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .filter_map(|entry| {
            let rel = entry.path().strip_prefix(root).ok()?;
            let parts: Vec<String> = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            Some(parts.join("/"))
        })
        .collect();
    files.sort();
    files
}
