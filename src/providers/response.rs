//! Tolerant extraction of a JSON payload from a model's free-text reply.
//!
//! Extraction and the fallback policy are separate: the `Option<&str>`
//! extractors only find a candidate, `parse_analysis` decides what a
//! failure turns into.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::models::AnalysisResult;

/// Maximum length of reply text included in parse-failure logs.
const PREVIEW_LEN: usize = 500;

static JSON_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\n(.*?)\n```").unwrap());

static BARE_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```\n(.*?)\n```").unwrap());

/// Content of the first ```` ```json ```` fence.
pub fn json_fenced(text: &str) -> Option<&str> {
    JSON_FENCE_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Content of the first fence without a language tag.
pub fn bare_fenced(text: &str) -> Option<&str> {
    BARE_FENCE_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Substring from the first `{` through the last `}`.
pub fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Pick the JSON candidate from a reply: a json fence, then a bare fence,
/// then the outermost brace span, then the whole text.
pub fn extract_json(text: &str) -> &str {
    json_fenced(text)
        .or_else(|| bare_fenced(text))
        .or_else(|| brace_span(text))
        .unwrap_or(text)
}

/// Parse a model reply into `T`, falling back to `T::default()`.
///
/// Parsed items are validated, so entries missing their essential field
/// never reach the caller.
pub fn parse_analysis<T: AnalysisResult>(text: &str) -> T {
    let candidate = extract_json(text);
    match serde_json::from_str::<T>(candidate) {
        Ok(result) => {
            let result = result.validated();
            debug!(items = result.len(), "parsed model reply");
            result
        }
        Err(e) => {
            let preview: String = text.chars().take(PREVIEW_LEN).collect();
            warn!(error = %e, reply = %preview, "failed to parse model reply, using empty result");
            T::default()
        }
    }
}
