//! Accumulates generated test code and writes it out in one pass.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{info, warn};

use crate::context::resolve_in_root;

/// Test code destined for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTestFile {
    /// Repo-relative path.
    pub path: String,
    pub chunks: Vec<String>,
}

/// Collects generated tests for a single run; nothing touches the disk
/// until [`TestFileCollector::flush`].
#[derive(Debug, Default)]
pub struct TestFileCollector {
    pending: IndexMap<String, PendingTestFile>,
}

impl TestFileCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `code` for `path`. Blank code is dropped.
    pub fn add(&mut self, path: &str, code: &str) {
        let code = code.trim_end();
        if code.trim().is_empty() {
            return;
        }
        self.pending
            .entry(path.to_string())
            .or_insert_with(|| PendingTestFile {
                path: path.to_string(),
                chunks: Vec::new(),
            })
            .chunks
            .push(code.to_string());
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending(&self) -> impl Iterator<Item = &PendingTestFile> {
        self.pending.values()
    }

    /// Write every pending file below `root`.
    ///
    /// Existing files get the new code appended after a blank line; missing
    /// files are created along with their parent directories. A file that
    /// cannot be written is logged and skipped. Returns the paths written.
    pub async fn flush(self, root: &Path) -> Vec<PathBuf> {
        let mut written = Vec::new();
        for file in self.pending.into_values() {
            match write_one(root, &file).await {
                Ok(path) => {
                    info!(file = %path.display(), chunks = file.chunks.len(), "wrote tests");
                    written.push(path);
                }
                Err(e) => warn!(file = %file.path, error = %e, "could not write test file"),
            }
        }
        written
    }
}

async fn write_one(root: &Path, file: &PendingTestFile) -> Result<PathBuf, std::io::Error> {
    let path = resolve_in_root(root, &file.path)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
    ensure_within_root(root, &path).await?;
    let addition = file.chunks.join("\n\n");

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(existing) => {
            let mut content = existing;
            if !content.is_empty() {
                if !content.ends_with('\n') {
                    content.push('\n');
                }
                content.push('\n');
            }
            content.push_str(&addition);
            content.push('\n');
            content
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            format!("{addition}\n")
        }
        Err(e) => return Err(e),
    };

    tokio::fs::write(&path, content).await?;
    Ok(PathBuf::from(&file.path))
}

/// Fail when the deepest existing ancestor of `path` resolves outside
/// `root` once symlinks are followed. Directories created below that
/// ancestor stay inside it.
async fn ensure_within_root(root: &Path, path: &Path) -> Result<(), std::io::Error> {
    let root = tokio::fs::canonicalize(root).await?;
    for ancestor in path.ancestors() {
        match tokio::fs::canonicalize(ancestor).await {
            Ok(resolved) if resolved.starts_with(&root) => return Ok(()),
            Ok(resolved) => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    format!("{} resolves outside the repository root", resolved.display()),
                ));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        }
    }
    Err(std::io::Error::new(
        std::io::ErrorKind::PermissionDenied,
        format!("{} is outside the repository root", path.display()),
    ))
}
