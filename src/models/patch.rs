//! Patch location types.

use serde::{Deserialize, Serialize};

/// Where a snippet was found inside a patch, in new-file coordinates.
///
/// All three fields are `None` when the snippet could not be located.
/// A located snippet always has both `start_line` and `end_line`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineLocation {
    /// First matched added line (1-based, inclusive).
    pub start_line: Option<u32>,
    /// Last matched added line (1-based, inclusive).
    pub end_line: Option<u32>,
    /// Leading whitespace recovered for the matched code.
    pub indentation: Option<String>,
}

impl LineLocation {
    /// The "not found" sentinel.
    pub fn not_found() -> Self {
        Self::default()
    }

    /// Returns the `(start, end)` pair when the location is complete.
    pub fn range(&self) -> Option<(u32, u32)> {
        match (self.start_line, self.end_line) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    /// Whether the snippet was located.
    pub fn is_found(&self) -> bool {
        self.range().is_some()
    }
}
