//! Line coverage report lookup.
//!
//! The report is a JSON array with one entry per source file:
//!
//! ```json
//! [{ "file": "lib/app.ex", "lines": [[1, true], [2, false], [3, null]] }]
//! ```
//!
//! `true`/`false` mark covered/uncovered lines; `null` marks lines that are
//! not relevant (comments, blank lines).

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Errors while reading a coverage report.
#[derive(Error, Debug)]
pub enum CoverageError {
    #[error("failed to read coverage file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse coverage file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Coverage of one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCoverage {
    pub file: String,
    #[serde(default)]
    pub lines: Vec<(u32, Option<bool>)>,
}

/// Parsed coverage report keyed by file path, in report order.
#[derive(Debug, Clone, Default)]
pub struct CoverageReport {
    files: IndexMap<String, FileCoverage>,
}

impl CoverageReport {
    /// Parse report JSON.
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<FileCoverage> = serde_json::from_str(json)?;
        Ok(entries.into_iter().collect())
    }

    /// Read and parse the report at `path`.
    pub async fn read(path: &Path) -> Result<Self, CoverageError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CoverageError::ReadFile {
                path: path.to_path_buf(),
                source: e,
            })?;
        Self::parse(&content).map_err(|e| CoverageError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Like [`CoverageReport::read`], but any failure yields an empty report.
    pub async fn load_or_empty(path: &Path) -> Self {
        match Self::read(path).await {
            Ok(report) => {
                info!(files = report.len(), path = %path.display(), "loaded coverage data");
                report
            }
            Err(CoverageError::ReadFile { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                info!(path = %path.display(), "coverage file not found");
                Self::default()
            }
            Err(e) => {
                warn!(error = %e, "ignoring coverage data");
                Self::default()
            }
        }
    }

    pub fn get(&self, file: &str) -> Option<&FileCoverage> {
        self.files.get(file)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FromIterator<FileCoverage> for CoverageReport {
    fn from_iter<I: IntoIterator<Item = FileCoverage>>(iter: I) -> Self {
        let files = iter
            .into_iter()
            .map(|entry| (entry.file.clone(), entry))
            .collect();
        Self { files }
    }
}

/// Line numbers explicitly marked uncovered, in report order.
pub fn uncovered_lines(coverage: &FileCoverage) -> Vec<u32> {
    coverage
        .lines
        .iter()
        .filter(|(_, covered)| *covered == Some(false))
        .map(|(line, _)| *line)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const REPORT: &str = r#"[
        {"file": "lib/app.ex", "lines": [[1, true], [2, false], [3, null], [7, false]]},
        {"file": "lib/other.ex", "lines": []}
    ]"#;

    #[test]
    fn parses_report_and_looks_up_files() {
        let report = CoverageReport::parse(REPORT).unwrap();
        assert_eq!(report.len(), 2);
        assert!(report.get("lib/app.ex").is_some());
        assert!(report.get("lib/missing.ex").is_none());
    }

    #[test]
    fn uncovered_lines_are_false_entries_only() {
        let report = CoverageReport::parse(REPORT).unwrap();
        let app = report.get("lib/app.ex").unwrap();
        assert_eq!(uncovered_lines(app), vec![2, 7]);
        assert!(uncovered_lines(report.get("lib/other.ex").unwrap()).is_empty());
    }

    #[test]
    fn missing_lines_field_defaults_to_empty() {
        let report = CoverageReport::parse(r#"[{"file": "a.ex"}]"#).unwrap();
        assert!(report.get("a.ex").unwrap().lines.is_empty());
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let report = CoverageReport::load_or_empty(&dir.path().join("coverage.json")).await;
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn invalid_json_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coverage.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            CoverageReport::read(&path).await,
            Err(CoverageError::ParseFile { .. })
        ));
        assert!(CoverageReport::load_or_empty(&path).await.is_empty());
    }

    #[tokio::test]
    async fn reads_report_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coverage.json");
        tokio::fs::write(&path, REPORT).await.unwrap();
        assert_eq!(CoverageReport::load_or_empty(&path).await.len(), 2);
    }
}
