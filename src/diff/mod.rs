//! Patch mapping engine for single-file unified diffs.
//!
//! GitHub returns one `patch` string per changed file. These modules
//! read that text directly: extracting added lines, locating a code
//! snippet in new-file coordinates, re-indenting suggestions, and
//! finding the end of the changed region.

pub mod added;
pub mod hunk;
pub mod indent;
pub mod locator;

pub use added::extract_added_lines;
pub use hunk::{HunkHeader, last_line_number, parse_hunk_header};
pub use indent::reformat;
pub use locator::locate;

/// Classification of a single patch line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PatchLine<'a> {
    /// A line starting with `@@`. `None` when the header is malformed.
    Hunk(Option<HunkHeader>),
    /// An added line with the leading `+` stripped.
    Added(&'a str),
    /// A removed line (including `---` file headers).
    Removed,
    /// Context and every other line, including `+++` file headers.
    Other,
}

impl<'a> PatchLine<'a> {
    pub(crate) fn classify(line: &'a str) -> Self {
        if line.starts_with("@@") {
            PatchLine::Hunk(parse_hunk_header(line))
        } else if line.starts_with("+++") {
            PatchLine::Other
        } else if let Some(content) = line.strip_prefix('+') {
            PatchLine::Added(content)
        } else if line.starts_with('-') {
            PatchLine::Removed
        } else {
            PatchLine::Other
        }
    }
}

/// Iterate over the classified lines of a patch.
pub(crate) fn patch_lines(patch: &str) -> impl Iterator<Item = PatchLine<'_>> {
    patch.split('\n').map(PatchLine::classify)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_added_strips_marker() {
        assert_eq!(PatchLine::classify("+  let x = 1;"), PatchLine::Added("  let x = 1;"));
        assert_eq!(PatchLine::classify("+"), PatchLine::Added(""));
    }

    #[test]
    fn classify_file_headers() {
        assert_eq!(PatchLine::classify("+++ b/lib/a.ex"), PatchLine::Other);
        assert_eq!(PatchLine::classify("--- a/lib/a.ex"), PatchLine::Removed);
    }

    #[test]
    fn classify_hunk_headers() {
        assert!(matches!(
            PatchLine::classify("@@ -1,2 +3,4 @@"),
            PatchLine::Hunk(Some(HunkHeader { new_start: 3, .. }))
        ));
        assert_eq!(PatchLine::classify("@@ broken"), PatchLine::Hunk(None));
    }

    #[test]
    fn classify_context_and_markers() {
        assert_eq!(PatchLine::classify(" unchanged"), PatchLine::Other);
        assert_eq!(PatchLine::classify(""), PatchLine::Other);
        assert_eq!(
            PatchLine::classify("\\ No newline at end of file"),
            PatchLine::Other
        );
    }
}
