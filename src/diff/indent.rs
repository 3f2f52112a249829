//! Re-indentation of suggested replacement code.

/// Re-indent every non-blank line of `suggestion` with `indentation`.
///
/// Existing leading whitespace is discarded, so nested blocks collapse to
/// a single level. Blank lines come out empty. A missing or empty
/// indentation leaves the suggestion untouched.
pub fn reformat(suggestion: Option<&str>, indentation: Option<&str>) -> Option<String> {
    let suggestion = suggestion?;
    let indentation = match indentation {
        Some(indent) if !indent.is_empty() && !suggestion.is_empty() => indent,
        _ => return Some(suggestion.to_string()),
    };

    let lines: Vec<String> = suggestion
        .split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{indentation}{}", line.trim_start())
            }
        })
        .collect();

    Some(lines.join("\n"))
}
