//! Snippet locator: maps model-echoed code back onto patch line numbers.
//!
//! Models rarely echo code with its original indentation, so matching
//! compares trimmed lines only. A multi-line snippet must match a run of
//! consecutive added lines; context lines break the run, removed lines
//! are transparent.
//!
//! The scan commits to the first place the snippet's opening line
//! matches. When a multi-line match breaks, only the breaking line is
//! retried as a new start. Earlier candidates are not revisited, so a
//! snippet whose first line repeats inside an unrelated run can be
//! missed.

use crate::models::LineLocation;

use super::{PatchLine, patch_lines};

/// Locate `snippet` among the added lines of `patch`.
///
/// Returns the inclusive new-file range of the matched added lines and
/// the indentation to re-apply to a replacement, or the "not found"
/// sentinel when either input is empty or no complete match exists.
pub fn locate(patch: Option<&str>, snippet: Option<&str>) -> LineLocation {
    let (Some(patch), Some(snippet)) = (
        patch.filter(|p| !p.is_empty()),
        snippet.filter(|s| !s.is_empty()),
    ) else {
        return LineLocation::not_found();
    };

    let normalized: Vec<&str> = snippet
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if normalized.is_empty() {
        return LineLocation::not_found();
    }

    let Some((start, end)) = find_range(patch, &normalized) else {
        return LineLocation::not_found();
    };

    LineLocation {
        start_line: Some(start),
        end_line: Some(end),
        indentation: snippet_indentation(snippet)
            .or_else(|| patch_indentation(patch, normalized[0])),
    }
}

/// In-progress match over consecutive added lines.
struct Match {
    start: u32,
    matched: usize,
}

impl Match {
    /// Begin a match at `line` if `trimmed` equals the snippet's first line.
    fn begin(trimmed: &str, normalized: &[&str], line: u32) -> Option<Self> {
        (trimmed == normalized[0]).then_some(Match {
            start: line,
            matched: 1,
        })
    }
}

fn find_range(patch: &str, normalized: &[&str]) -> Option<(u32, u32)> {
    let mut current_line: u32 = 0;
    let mut state: Option<Match> = None;

    for line in patch_lines(patch) {
        match line {
            PatchLine::Hunk(header) => {
                if let Some(header) = header {
                    current_line = header.new_start;
                }
                continue;
            }
            PatchLine::Added(content) => {
                let trimmed = content.trim();

                state = match state.take() {
                    None => {
                        let started = Match::begin(trimmed, normalized, current_line);
                        if started.is_some() && normalized.len() == 1 {
                            return Some((current_line, current_line));
                        }
                        started
                    }
                    Some(mut m) if trimmed == normalized[m.matched] => {
                        m.matched += 1;
                        if m.matched == normalized.len() {
                            return Some((m.start, current_line));
                        }
                        Some(m)
                    }
                    // Broken run: the breaking line may itself open a new match.
                    Some(_) => Match::begin(trimmed, normalized, current_line),
                };

                current_line = current_line.saturating_add(1);
            }
            PatchLine::Removed => {}
            PatchLine::Other => {
                current_line = current_line.saturating_add(1);
                state = None;
            }
        }
    }

    // A completed match returns during the scan; only a dangling
    // single-line start could remain here.
    match state {
        Some(m) if normalized.len() == 1 => Some((m.start, m.start)),
        _ => None,
    }
}

/// Leading whitespace of the snippet's first non-blank line, if any.
fn snippet_indentation(snippet: &str) -> Option<String> {
    snippet
        .split('\n')
        .find(|line| !line.trim().is_empty())
        .map(leading_whitespace)
        .filter(|ws| !ws.is_empty())
        .map(str::to_string)
}

/// Leading whitespace of the first added line whose trimmed content is
/// `first`. This need not be the matched line.
fn patch_indentation(patch: &str, first: &str) -> Option<String> {
    patch_lines(patch)
        .find_map(|line| match line {
            PatchLine::Added(content) if content.trim() == first => Some(content),
            _ => None,
        })
        .map(leading_whitespace)
        .filter(|ws| !ws.is_empty())
        .map(str::to_string)
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}
