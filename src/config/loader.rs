//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags (applied by the caller after loading)
//! 2. Environment variables
//! 3. `.prbot.toml` in repo root
//! 4. `~/.config/prbot/config.toml` (global defaults)
//! 5. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::constants;
use crate::env::Env;
use crate::models::{ProviderName, TestMode};

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub github: GithubConfig,
    pub review: ReviewConfig,
    pub tests: TestsConfig,
}

/// LLM provider configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub name: ProviderName,
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub max_tokens: u64,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: ProviderName::Anthropic,
            model: "claude-3-7-sonnet-latest".to_string(),
            base_url: None,
            api_key: None,
            max_tokens: 4000,
        }
    }
}

/// Code host (GitHub) configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub api_url: String,
    pub token: Option<String>,
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: constants::DEFAULT_GITHUB_API_URL.to_string(),
            token: None,
        }
    }
}

/// Code review bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Directory of Markdown rule documents, relative to the repo root.
    pub rules_path: PathBuf,
    /// Ignore-pattern file, relative to the repo root.
    pub ignore_file: PathBuf,
    /// Max concurrent model calls.
    pub max_concurrent: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            rules_path: PathBuf::from(constants::DEFAULT_RULES_PATH),
            ignore_file: PathBuf::from(constants::DEFAULT_IGNORE_FILE),
            max_concurrent: 1,
        }
    }
}

/// Test writer bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TestsConfig {
    /// Coverage report, relative to the repo root.
    pub coverage_path: PathBuf,
    /// File extensions (without the dot) the test writer considers.
    pub extensions: Vec<String>,
    pub mode: TestMode,
    /// Directory test files live under.
    pub test_dir: String,
    /// Largest repository tree handed to the model for test-file mapping.
    pub model_mapping_threshold: usize,
    /// Language tag for fenced test code in comments.
    pub code_fence_language: String,
    /// Max concurrent model calls.
    pub max_concurrent: usize,
}

impl Default for TestsConfig {
    fn default() -> Self {
        Self {
            coverage_path: PathBuf::from(constants::DEFAULT_COVERAGE_PATH),
            extensions: vec!["ex".to_string(), "exs".to_string()],
            mode: TestMode::Suggest,
            test_dir: "test".to_string(),
            model_mapping_threshold: 500,
            code_fence_language: "elixir".to_string(),
            max_concurrent: 1,
        }
    }
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// Reads from global config, repo-local config, then applies
    /// environment variable overrides.
    pub fn load(repo_root: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        Self::load_layers(Self::global_config_path().as_deref(), repo_root, env)
    }

    fn load_layers(
        global_path: Option<&Path>,
        repo_root: Option<&Path>,
        env: &Env,
    ) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // Layer 4: global config
        if let Some(global_path) = global_path {
            if global_path.exists() {
                let global = Self::load_file(global_path)?;
                config.merge(global);
            }
        }

        // Layer 3: repo-local config
        if let Some(root) = repo_root {
            let local_path = root.join(constants::CONFIG_FILENAME);
            if local_path.exists() {
                let local = Self::load_file(&local_path)?;
                config.merge(local);
            }
        }

        // Layer 2: environment variables
        config.apply_env_vars(env);

        Ok(config)
    }

    /// Load a config from a specific file.
    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the global config file path.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(constants::CONFIG_DIR).join("config.toml"))
    }

    /// Merge another config into this one (other takes precedence for non-default values).
    fn merge(&mut self, other: Config) {
        // Provider settings
        let default_provider = ProviderConfig::default();
        if other.provider.name != default_provider.name {
            self.provider.name = other.provider.name;
        }
        if other.provider.model != default_provider.model {
            self.provider.model = other.provider.model;
        }
        if other.provider.base_url.is_some() {
            self.provider.base_url = other.provider.base_url;
        }
        if other.provider.api_key.is_some() {
            self.provider.api_key = other.provider.api_key;
        }
        if other.provider.max_tokens != default_provider.max_tokens {
            self.provider.max_tokens = other.provider.max_tokens;
        }

        // GitHub settings
        if other.github.api_url != GithubConfig::default().api_url {
            self.github.api_url = other.github.api_url;
        }
        if other.github.token.is_some() {
            self.github.token = other.github.token;
        }

        // Review settings
        let default_review = ReviewConfig::default();
        if other.review.rules_path != default_review.rules_path {
            self.review.rules_path = other.review.rules_path;
        }
        if other.review.ignore_file != default_review.ignore_file {
            self.review.ignore_file = other.review.ignore_file;
        }
        if other.review.max_concurrent != default_review.max_concurrent {
            self.review.max_concurrent = other.review.max_concurrent;
        }

        // Test writer settings
        let default_tests = TestsConfig::default();
        if other.tests.coverage_path != default_tests.coverage_path {
            self.tests.coverage_path = other.tests.coverage_path;
        }
        if other.tests.extensions != default_tests.extensions {
            self.tests.extensions = other.tests.extensions;
        }
        if other.tests.mode != default_tests.mode {
            self.tests.mode = other.tests.mode;
        }
        if other.tests.test_dir != default_tests.test_dir {
            self.tests.test_dir = other.tests.test_dir;
        }
        if other.tests.model_mapping_threshold != default_tests.model_mapping_threshold {
            self.tests.model_mapping_threshold = other.tests.model_mapping_threshold;
        }
        if other.tests.code_fence_language != default_tests.code_fence_language {
            self.tests.code_fence_language = other.tests.code_fence_language;
        }
        if other.tests.max_concurrent != default_tests.max_concurrent {
            self.tests.max_concurrent = other.tests.max_concurrent;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_vars(&mut self, env: &Env) {
        if let Some(val) = env.non_empty(constants::ENV_PROVIDER) {
            if let Ok(name) = val.parse::<ProviderName>() {
                self.provider.name = name;
            } else {
                warn!("ignoring invalid {} value: {val}", constants::ENV_PROVIDER);
            }
        }
        if let Some(val) = env.non_empty(constants::ENV_MODEL) {
            self.provider.model = val;
        }
        if let Some(val) = env.non_empty(constants::ENV_BASE_URL) {
            self.provider.base_url = Some(val);
        }

        let key_vars = [constants::ENV_API_KEY, self.provider.name.api_key_env_var()];
        if let Some(key) = env.first_non_empty(&key_vars) {
            self.provider.api_key = Some(key);
        }

        if let Some(val) = env.non_empty(constants::ENV_GITHUB_TOKEN) {
            self.github.token = Some(val);
        }
        if let Some(val) = env.non_empty(constants::ENV_GITHUB_API_URL) {
            self.github.api_url = val;
        }

        if let Some(val) = env.non_empty(constants::ENV_RULES_PATH) {
            self.review.rules_path = PathBuf::from(val);
        }
        if let Some(val) = env.non_empty(constants::ENV_COVERAGE_PATH) {
            self.tests.coverage_path = PathBuf::from(val);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn no_env() -> Env {
        Env::mock(Vec::<(&str, &str)>::new())
    }

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.provider.name, ProviderName::Anthropic);
        assert_eq!(config.provider.max_tokens, 4000);
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.review.rules_path, PathBuf::from(".ai-code-rules"));
        assert_eq!(config.review.ignore_file, PathBuf::from(".ai-analyzer-ignore"));
        assert_eq!(config.tests.extensions, vec!["ex", "exs"]);
        assert_eq!(config.tests.mode, TestMode::Suggest);
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[provider]
name = "openai"
model = "gpt-4o"

[review]
rules_path = "docs/rules"
max_concurrent = 4

[tests]
mode = "implement"
extensions = ["rs"]
code_fence_language = "rust"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.provider.name, ProviderName::OpenAI);
        assert_eq!(config.provider.model, "gpt-4o");
        assert_eq!(config.review.rules_path, PathBuf::from("docs/rules"));
        assert_eq!(config.review.max_concurrent, 4);
        assert_eq!(config.tests.mode, TestMode::Implement);
        assert_eq!(config.tests.extensions, vec!["rs"]);
        assert_eq!(config.tests.code_fence_language, "rust");
        // Untouched sections keep their defaults
        assert_eq!(config.tests.test_dir, "test");
    }

    #[test]
    fn merge_overrides_non_default_values() {
        let mut base = Config::default();
        let mut other = Config::default();
        other.provider.name = ProviderName::Groq;
        other.provider.api_key = Some("sk-test".into());
        other.github.token = Some("ghp".into());
        other.review.rules_path = PathBuf::from("rules");
        other.tests.model_mapping_threshold = 10;

        base.merge(other);

        assert_eq!(base.provider.name, ProviderName::Groq);
        assert_eq!(base.provider.api_key.as_deref(), Some("sk-test"));
        assert_eq!(base.github.token.as_deref(), Some("ghp"));
        assert_eq!(base.review.rules_path, PathBuf::from("rules"));
        assert_eq!(base.tests.model_mapping_threshold, 10);
    }

    #[test]
    fn merge_keeps_base_when_other_is_default() {
        let mut base = Config::default();
        base.provider.model = "gpt-4o".into();
        base.tests.mode = TestMode::Implement;

        base.merge(Config::default());

        assert_eq!(base.provider.model, "gpt-4o");
        assert_eq!(base.tests.mode, TestMode::Implement);
    }

    #[test]
    fn load_file_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "not valid {{ toml").unwrap();

        let err = Config::load_file(&path).unwrap_err();
        assert!(err.to_string().contains("parse"));
    }

    #[test]
    fn load_file_not_found() {
        let err = Config::load_file(Path::new("/tmp/prbot_not_exist_config.toml")).unwrap_err();
        assert!(err.to_string().contains("read"));
    }

    #[test]
    fn repo_config_overrides_global() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        std::fs::write(&global, "[provider]\nmodel = \"global-model\"\nmax_tokens = 8000\n").unwrap();
        std::fs::write(
            dir.path().join(".prbot.toml"),
            "[provider]\nmodel = \"repo-model\"\n",
        )
        .unwrap();

        let config = Config::load_layers(Some(&global), Some(dir.path()), &no_env()).unwrap();
        assert_eq!(config.provider.model, "repo-model");
        assert_eq!(config.provider.max_tokens, 8000);
    }

    #[test]
    fn load_without_any_config_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_layers(None, Some(dir.path()), &no_env()).unwrap();
        assert_eq!(config.provider.name, ProviderName::Anthropic);
    }

    #[test]
    fn env_overrides_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".prbot.toml"),
            "[review]\nrules_path = \"from-file\"\n",
        )
        .unwrap();
        let env = Env::mock([
            ("RULES_PATH", "from-env"),
            ("GITHUB_TOKEN", "ghp_env"),
            ("COVERAGE_PATH", "cov.json"),
        ]);

        let config = Config::load_layers(None, Some(dir.path()), &env).unwrap();
        assert_eq!(config.review.rules_path, PathBuf::from("from-env"));
        assert_eq!(config.github.token.as_deref(), Some("ghp_env"));
        assert_eq!(config.tests.coverage_path, PathBuf::from("cov.json"));
    }

    #[test]
    fn apply_env_vars_provider_and_api_key() {
        let env = Env::mock([("PRBOT_PROVIDER", "openai"), ("PRBOT_API_KEY", "sk-env")]);
        let mut config = Config::default();
        config.apply_env_vars(&env);
        assert_eq!(config.provider.name, ProviderName::OpenAI);
        assert_eq!(config.provider.api_key.as_deref(), Some("sk-env"));
    }

    #[test]
    fn apply_env_vars_provider_specific_api_key_fallback() {
        let env = Env::mock([("ANTHROPIC_API_KEY", "sk-anthropic")]);
        let mut config = Config::default();
        config.apply_env_vars(&env);
        assert_eq!(config.provider.api_key.as_deref(), Some("sk-anthropic"));
    }

    #[test]
    fn apply_env_vars_invalid_provider_falls_back() {
        let env = Env::mock([("PRBOT_PROVIDER", "not-a-provider")]);
        let mut config = Config::default();
        config.apply_env_vars(&env);
        assert_eq!(config.provider.name, ProviderName::Anthropic);
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut config = Config::default();
        config.provider.api_key = Some("sk-secret".into());
        config.github.token = Some("ghp-secret".into());
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(!rendered.contains("ghp-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
