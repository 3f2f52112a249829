//! Clap argument types.

use clap::{Args, Parser};
use std::path::PathBuf;

use prbot::models::TestMode;

/// AI pull-request bots: rule-based review comments and unit test suggestions.
#[derive(Parser, Debug)]
#[command(name = "prbot", version = prbot::constants::VERSION)]
pub struct Cli {
    /// Log debug output.
    #[arg(long, short, global = true, default_value_t = false, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors.
    #[arg(long, short, global = true, default_value_t = false)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Review a pull request against the rule set.
    Review(ReviewArgs),

    /// Suggest or write unit tests for a pull request.
    Tests(TestsArgs),

    /// Locate a code snippet inside a unified-diff patch.
    Locate(LocateArgs),
}

/// Options shared by the commands that talk to a pull request.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Checkout of the pull request head.
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Repository as OWNER/REPO (defaults to the Actions environment).
    #[arg(long)]
    pub repo: Option<String>,

    /// Pull request number (defaults to the Actions event payload).
    #[arg(long)]
    pub pr: Option<u64>,

    /// Print the comments as JSON instead of posting them.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

/// Arguments for the `review` subcommand.
#[derive(Args, Debug)]
pub struct ReviewArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Directory containing the Markdown rule documents.
    #[arg(long)]
    pub rules_path: Option<PathBuf>,

    /// Ignore-pattern file.
    #[arg(long)]
    pub ignore_file: Option<PathBuf>,

    /// Maximum concurrent model calls.
    #[arg(long)]
    pub max_concurrent: Option<usize>,
}

/// Arguments for the `tests` subcommand.
#[derive(Args, Debug)]
pub struct TestsArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Line coverage report (JSON).
    #[arg(long)]
    pub coverage_path: Option<PathBuf>,

    /// Post suggestions as comments or write test files.
    #[arg(long, value_enum)]
    pub mode: Option<TestMode>,

    /// File extensions to consider, comma-separated.
    #[arg(long, value_delimiter = ',')]
    pub extensions: Option<Vec<String>>,

    /// Maximum concurrent model calls.
    #[arg(long)]
    pub max_concurrent: Option<usize>,
}

/// Arguments for the `locate` subcommand.
#[derive(Args, Debug)]
#[command(group(
    clap::ArgGroup::new("snippet_source")
        .required(true)
        .args(["snippet", "snippet_file"]),
))]
pub struct LocateArgs {
    /// File holding the patch text of a single file.
    #[arg(long)]
    pub patch_file: PathBuf,

    /// Snippet to locate.
    #[arg(long)]
    pub snippet: Option<String>,

    /// Read the snippet from a file.
    #[arg(long)]
    pub snippet_file: Option<PathBuf>,

    /// Suggestion to re-indent to the located code.
    #[arg(long)]
    pub suggestion: Option<String>,
}

impl TestsArgs {
    /// Extensions with any leading dot removed; `None` when not given.
    pub fn normalized_extensions(&self) -> Option<Vec<String>> {
        self.extensions.as_ref().map(|exts| {
            exts.iter()
                .map(|e| e.trim().trim_start_matches('.').to_string())
                .filter(|e| !e.is_empty())
                .collect()
        })
    }
}
