//! Hunk header parsing and end-of-change anchoring.

use super::{PatchLine, patch_lines};

/// Parsed `@@ -old_start,old_count +new_start,new_count @@ section` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HunkHeader {
    pub old_start: u32,
    pub old_count: u32,
    pub new_start: u32,
    pub new_count: u32,
    /// Trailing section text (e.g. the enclosing function), if any.
    pub section: Option<String>,
}

impl HunkHeader {
    /// Last new-file line covered by this hunk, never below 1.
    pub fn new_end(&self) -> u32 {
        self.new_start
            .saturating_add(self.new_count)
            .saturating_sub(1)
            .max(1)
    }
}

/// Parse a hunk header line. Returns `None` for anything that is not a
/// well-formed header.
pub fn parse_hunk_header(line: &str) -> Option<HunkHeader> {
    let line = line.strip_prefix("@@ ")?;
    let end = line.find(" @@")?;
    let range_part = &line[..end];
    let section = {
        let rest = line[end + 3..].trim();
        if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        }
    };

    let mut parts = range_part.split(' ');
    let old = parts.next()?.strip_prefix('-')?;
    let new = parts.next()?.strip_prefix('+')?;
    if parts.next().is_some() {
        return None;
    }

    let (old_start, old_count) = parse_range(old)?;
    let (new_start, new_count) = parse_range(new)?;

    Some(HunkHeader {
        old_start,
        old_count,
        new_start,
        new_count,
        section,
    })
}

/// Parse "start,count" or "start" (count defaults to 1).
fn parse_range(s: &str) -> Option<(u32, u32)> {
    if let Some((start, count)) = s.split_once(',') {
        Some((start.parse().ok()?, count.parse().ok()?))
    } else {
        Some((s.parse().ok()?, 1))
    }
}

/// Highest new-file line implied by the last hunk header of a patch.
///
/// Used to anchor comments at the end of the changed region when no
/// snippet location is available. Falls back to `1` when the patch is
/// absent or carries no parseable header.
pub fn last_line_number(patch: Option<&str>) -> u32 {
    let Some(patch) = patch else {
        return 1;
    };

    patch_lines(patch)
        .filter_map(|line| match line {
            PatchLine::Hunk(header) => header,
            _ => None,
        })
        .last()
        .map_or(1, |header| header.new_end())
}
