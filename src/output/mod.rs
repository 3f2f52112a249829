//! Output: review comment bodies, dry-run capture, and JSON rendering.

pub mod comment;
pub mod dry_run;
pub mod json;

pub use comment::{review_comment_body, test_suggestion_body};
pub use dry_run::DryRunHost;
pub use json::render_run;
