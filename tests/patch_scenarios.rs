//! Patch handling scenarios exercised through the public API.

use pretty_assertions::assert_eq;

use prbot::diff::{extract_added_lines, last_line_number, locate, reformat};
use prbot::filter::should_ignore;
use prbot::models::LineLocation;

const PATCH: &str = "@@ -1,3 +1,4 @@\n const a = 1;\n+const b = 2;\n+const c = 3;\n const d = 4;";

#[test]
fn single_added_line_is_located() {
    let loc = locate(Some(PATCH), Some("const b = 2;"));
    assert_eq!(loc.range(), Some((2, 2)));
}

#[test]
fn consecutive_added_lines_form_a_range() {
    let loc = locate(Some(PATCH), Some("const b = 2;\nconst c = 3;"));
    assert_eq!(loc.range(), Some((2, 3)));
}

#[test]
fn indentation_comes_from_the_snippet() {
    let patch = "@@ -1,1 +1,2 @@\n function f() {\n+  const indented = true;";
    let loc = locate(Some(patch), Some("  const indented = true;"));
    assert_eq!(
        loc,
        LineLocation {
            start_line: Some(2),
            end_line: Some(2),
            indentation: Some("  ".into()),
        }
    );
}

#[test]
fn indentation_falls_back_to_the_patch() {
    let patch = "@@ -1,1 +1,2 @@\n function f() {\n+    const x = 1;";
    let loc = locate(Some(patch), Some("const x = 1;"));
    assert_eq!(loc.indentation.as_deref(), Some("    "));
    assert_eq!(
        reformat(Some("let x = 1;\n\nreturn x;"), loc.indentation.as_deref()).as_deref(),
        Some("    let x = 1;\n\n    return x;")
    );
}

#[test]
fn context_line_breaks_a_partial_match() {
    let patch = "@@ -1,2 +1,3 @@\n+a\n b\n+c";
    assert!(!locate(Some(patch), Some("a\nc")).is_found());
}

#[test]
fn removed_lines_do_not_break_a_match() {
    let patch = "@@ -1,2 +1,2 @@\n+a\n-old\n+c";
    assert_eq!(locate(Some(patch), Some("a\nc")).range(), Some((1, 2)));
}

#[test]
fn file_headers_are_not_added_lines() {
    let patch = "--- a/x.js\n+++ b/x.js\n@@ -0,0 +1,2 @@\n+one\n+two";
    assert_eq!(extract_added_lines(Some(patch)), vec!["one", "two"]);
}

#[test]
fn last_line_uses_the_final_hunk() {
    let patch = "@@ -1,3 +1,4 @@\n a\n+b\n@@ -10,4 +11,5 @@\n c\n+d";
    assert_eq!(last_line_number(Some(patch)), 15);
    assert_eq!(last_line_number(None), 1);
}

#[test]
fn absent_inputs_are_not_found() {
    assert!(!locate(None, Some("x")).is_found());
    assert!(!locate(Some(PATCH), None).is_found());
    assert!(!locate(Some(PATCH), Some("  \n\t\n")).is_found());
}

#[test]
fn reformat_edge_cases() {
    assert_eq!(reformat(Some("x"), None).as_deref(), Some("x"));
    assert_eq!(reformat(None, Some("  ")), None);
    assert_eq!(reformat(Some(""), Some("  ")).as_deref(), Some(""));
}

#[test]
fn ignore_patterns() {
    let none: [&str; 0] = [];
    assert!(!should_ignore("src/a.js", &none));
    assert!(should_ignore("node_modules/pkg/index.js", &["node_modules/*"]));
    assert!(should_ignore("dist/app.min.js", &["*.min.js"]));
    assert!(!should_ignore("src/app.js", &["*.min.js"]));
}
