//! Ignore patterns for excluding changed files from analysis.
//!
//! Patterns use a deliberately small glob language: `*` matches any run
//! of characters (including `/`), `?` matches one character, everything
//! else is literal. A pattern is anchored at both ends. A file is also
//! ignored when one of its ancestor directories matches, so
//! `node_modules/*` covers files at any depth below `node_modules/`.

use std::path::Path;

use regex::Regex;
use tracing::{debug, info, warn};

/// A compiled set of ignore patterns.
#[derive(Debug, Clone, Default)]
pub struct IgnoreMatcher {
    patterns: Vec<Regex>,
}

impl IgnoreMatcher {
    /// Compile `patterns`. A pattern that fails to compile is skipped
    /// with a warning.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|p| {
                let p = p.as_ref();
                match compile_pattern(p) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        warn!(pattern = p, error = %e, "skipping invalid ignore pattern");
                        None
                    }
                }
            })
            .collect();
        Self { patterns }
    }

    /// Whether no patterns are loaded.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether `filename` or any of its ancestor directories matches.
    pub fn is_ignored(&self, filename: &str) -> bool {
        if self.patterns.is_empty() {
            return false;
        }

        let parts: Vec<&str> = filename.split('/').collect();
        self.patterns.iter().any(|re| {
            re.is_match(filename)
                || (1..parts.len()).any(|i| re.is_match(&parts[..i].join("/")))
        })
    }
}

/// One-shot check of `filename` against uncompiled patterns.
pub fn should_ignore<S: AsRef<str>>(filename: &str, patterns: &[S]) -> bool {
    if patterns.is_empty() {
        return false;
    }
    IgnoreMatcher::new(patterns).is_ignored(filename)
}

/// Translate a glob-like pattern into an anchored regex.
fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push('^');
    for c in pattern.chars() {
        match c {
            '.' => re.push_str(r"\."),
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            other => re.push_str(&regex::escape(&other.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re)
}

/// Parse an ignore file: one pattern per line, `#` comments and blank
/// lines dropped, surrounding whitespace trimmed.
pub fn parse_ignore_patterns(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Load ignore patterns from `path`. A missing or unreadable file yields
/// no patterns.
pub async fn load_ignore_patterns(path: &Path) -> Vec<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => {
            let patterns = parse_ignore_patterns(&content);
            info!(
                count = patterns.len(),
                file = %path.display(),
                "loaded ignore patterns"
            );
            patterns
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(file = %path.display(), "no ignore file found, analyzing all files");
            Vec::new()
        }
        Err(e) => {
            warn!(file = %path.display(), error = %e, "failed to read ignore file");
            Vec::new()
        }
    }
}
