//! Added-line extraction.

use super::{PatchLine, patch_lines};

/// Return the content of every added line in `patch`, in source order.
///
/// The leading `+` is stripped and the remainder is kept verbatim.
/// `+++` file headers are excluded. An absent or empty patch yields an
/// empty vec.
pub fn extract_added_lines(patch: Option<&str>) -> Vec<String> {
    let Some(patch) = patch.filter(|p| !p.is_empty()) else {
        return Vec::new();
    };

    patch_lines(patch)
        .filter_map(|line| match line {
            PatchLine::Added(content) => Some(content.to_string()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn none_and_empty_yield_nothing() {
        assert!(extract_added_lines(None).is_empty());
        assert!(extract_added_lines(Some("")).is_empty());
    }

    #[test]
    fn extracts_added_lines_in_order() {
        let patch = "@@ -1,3 +1,5 @@\n const a = 1;\n+const b = 2;\n+const e = 5;\n const c = 3;\n const d = 4;";
        assert_eq!(
            extract_added_lines(Some(patch)),
            vec!["const b = 2;", "const e = 5;"]
        );
    }

    #[test]
    fn excludes_file_header() {
        let patch = "--- a/file.js\n+++ b/file.js\n@@ -1,3 +1,4 @@\n const a = 1;\n+const b = 2;\n const c = 3;";
        assert_eq!(extract_added_lines(Some(patch)), vec!["const b = 2;"]);
    }

    #[test]
    fn keeps_internal_whitespace_and_blank_additions() {
        let patch = "@@ -0,0 +1,3 @@\n+  def run do\n+\n+    :ok\t";
        assert_eq!(
            extract_added_lines(Some(patch)),
            vec!["  def run do", "", "    :ok\t"]
        );
    }

    #[test]
    fn removed_lines_are_ignored() {
        let patch = "@@ -1,2 +1,1 @@\n-old\n--double dash content\n+new";
        assert_eq!(extract_added_lines(Some(patch)), vec!["new"]);
    }

    #[test]
    fn extraction_is_deterministic() {
        let patch = "@@ -1 +1,2 @@\n a\n+b\n+c";
        assert_eq!(
            extract_added_lines(Some(patch)),
            extract_added_lines(Some(patch))
        );
    }
}
