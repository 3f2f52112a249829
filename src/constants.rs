//! App-wide constants.
//!
//! Centralises the tool name, config paths, default file locations,
//! and environment variable names so a rename only requires changing
//! this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "prbot";

/// Tool version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Local config filename (e.g. `.prbot.toml` in repo root).
pub const CONFIG_FILENAME: &str = ".prbot.toml";

/// Directory name under `~/.config/` for global config.
pub const CONFIG_DIR: &str = "prbot";

/// Default directory holding the Markdown rule documents.
pub const DEFAULT_RULES_PATH: &str = ".ai-code-rules";

/// Default ignore-pattern file in the repository root.
pub const DEFAULT_IGNORE_FILE: &str = ".ai-analyzer-ignore";

/// Default coverage report consumed by the test writer.
pub const DEFAULT_COVERAGE_PATH: &str = "cover/coverage.json";

/// Default GitHub REST API base URL.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// GitHub REST API version header value.
pub const GITHUB_API_VERSION: &str = "2022-11-28";

// ── Environment variable names ──────────────────────────────────────

pub const ENV_PROVIDER: &str = "PRBOT_PROVIDER";
pub const ENV_MODEL: &str = "PRBOT_MODEL";
pub const ENV_API_KEY: &str = "PRBOT_API_KEY";
pub const ENV_BASE_URL: &str = "PRBOT_BASE_URL";
pub const ENV_RULES_PATH: &str = "RULES_PATH";
pub const ENV_COVERAGE_PATH: &str = "COVERAGE_PATH";

pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const ENV_GITHUB_API_URL: &str = "GITHUB_API_URL";
pub const ENV_GITHUB_REPOSITORY: &str = "GITHUB_REPOSITORY";
pub const ENV_GITHUB_EVENT_PATH: &str = "GITHUB_EVENT_PATH";
pub const ENV_GITHUB_OWNER: &str = "GITHUB_OWNER";
pub const ENV_GITHUB_REPO: &str = "GITHUB_REPO";
pub const ENV_PR_NUMBER: &str = "PR_NUMBER";
