//! Rule documents the review model checks code against.
//!
//! A rule is a Markdown file. Its id is the file stem and its title is the
//! first level-1 heading. An optional YAML frontmatter block may set `id`
//! and `title` explicitly:
//!
//! ```markdown
//! ---
//! id: no-io-puts
//! title: Use Logger instead of IO.puts
//! ---
//!
//! Production code must log through `Logger`.
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Errors while loading rules.
#[derive(Error, Debug)]
pub enum RulesError {
    #[error("failed to read rule file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid frontmatter in {path}: {message}")]
    Frontmatter { path: PathBuf, message: String },

    #[error("failed to walk rules directory {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
}

/// A single coding rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub id: String,
    pub title: String,
    /// Markdown body, frontmatter removed.
    pub content: String,
    pub path: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
struct RuleFrontmatter {
    id: Option<String>,
    title: Option<String>,
}

/// Load every `*.md` file below `dir`, sorted by path.
///
/// A missing directory yields no rules.
pub fn load_rules(dir: &Path) -> Result<Vec<Rule>, RulesError> {
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "rules directory not found");
        return Ok(Vec::new());
    }

    let mut rules = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| RulesError::Walk {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "md") {
            continue;
        }

        let content = std::fs::read_to_string(path).map_err(|e| RulesError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        rules.push(parse_rule(path, &content)?);
    }

    info!(count = rules.len(), dir = %dir.display(), "loaded rules");
    Ok(rules)
}

/// Build a rule from a Markdown document at `path`.
pub fn parse_rule(path: &Path, content: &str) -> Result<Rule, RulesError> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let (frontmatter, body) = match split_frontmatter(content) {
        Some((yaml, body)) => {
            let fm: RuleFrontmatter = if yaml.trim().is_empty() {
                RuleFrontmatter::default()
            } else {
                serde_yaml_ng::from_str(yaml).map_err(|e| RulesError::Frontmatter {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?
            };
            (fm, body.trim_start_matches(['\r', '\n']))
        }
        None => (RuleFrontmatter::default(), content),
    };

    let title = frontmatter
        .title
        .or_else(|| first_heading(body))
        .unwrap_or_else(|| stem.clone());

    Ok(Rule {
        id: frontmatter.id.unwrap_or(stem),
        title,
        content: body.to_string(),
        path: path.to_path_buf(),
    })
}

/// Split a leading `---` fenced YAML block from the body.
fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let rest = content.strip_prefix("---")?;
    let rest = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n"))?;
    if let Some(body) = rest.strip_prefix("---") {
        return Some(("", body));
    }
    let end = rest.find("\n---")?;
    Some((&rest[..end], &rest[end + 4..]))
}

/// Text of the first `# ` heading outside fenced code blocks.
fn first_heading(markdown: &str) -> Option<String> {
    let mut in_fence = false;
    for line in markdown.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some(title) = trimmed.strip_prefix("# ") {
            let title = title.trim().trim_end_matches('#').trim();
            if !title.is_empty() {
                return Some(title.to_string());
            }
        }
    }
    None
}
