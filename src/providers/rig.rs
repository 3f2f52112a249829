//! rig-core integration for LLM completions.
//!
//! Uses rig-core's provider clients and Agent abstraction for multi-provider
//! support. Currently supports: Anthropic, OpenAI, Gemini, DeepSeek, Groq,
//! and any OpenAI-compatible API.

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers;

use crate::config::ProviderConfig;
use crate::models::ProviderName;

use super::{CompletionProvider, ProviderError};

/// Build an agent from a rig-core client and prompt it once.
macro_rules! prompt_simple {
    ($client:expr, $model:expr, $max_tokens:expr, $system:expr, $user:expr, $label:expr) => {{
        let agent = $client
            .agent($model)
            .preamble($system)
            .temperature(0.0)
            .max_tokens($max_tokens)
            .build();
        agent
            .prompt($user)
            .await
            .map_err(|e| ProviderError::ApiError(format!("{} API error: {e}", $label)))
    }};
}

/// Create a rig-core client using the `Client::new(api_key)` convention.
macro_rules! new_client {
    ($provider_mod:path, $api_key:expr, $label:expr) => {{
        <$provider_mod>::new($api_key).map_err(|e| {
            ProviderError::ApiError(format!("failed to create {} client: {e}", $label))
        })
    }};
}

/// rig-core based completion provider.
///
/// The provider name in config selects which rig-core client is built.
pub struct RigProvider {
    config: ProviderConfig,
}

impl RigProvider {
    /// Create a new RigProvider, failing fast when no API key is configured
    /// or an OpenAI-compatible endpoint has no base URL.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        if config.api_key.is_none() {
            return Err(ProviderError::NotConfigured(format!(
                "no API key found for provider '{}'. Set {} or {}.",
                config.name,
                crate::constants::ENV_API_KEY,
                config.name.api_key_env_var()
            )));
        }
        let provider = Self { config };
        if provider.config.name == ProviderName::OpenAICompatible {
            provider.require_base_url()?;
        }
        Ok(provider)
    }

    /// Model this provider sends requests to.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Build an OpenAI-style client, optionally with a custom base URL.
    fn build_openai_client(
        &self,
        api_key: &str,
        base_url: Option<&str>,
        label: &str,
    ) -> Result<providers::openai::CompletionsClient, ProviderError> {
        let mut builder = providers::openai::CompletionsClient::builder().api_key(api_key);
        if let Some(base_url) = base_url {
            builder = builder.base_url(base_url);
        }
        builder
            .build()
            .map_err(|e| ProviderError::ApiError(format!("failed to create {label} client: {e}")))
    }

    /// Require `base_url` for OpenAI-compatible providers.
    fn require_base_url(&self) -> Result<&str, ProviderError> {
        self.config.base_url.as_deref().ok_or_else(|| {
            ProviderError::NotConfigured(
                "openai-compatible provider requires base_url to be set".to_string(),
            )
        })
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("missing API key".to_string()))
    }
}

#[async_trait]
impl CompletionProvider for RigProvider {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, ProviderError> {
        let api_key = self.api_key()?;
        let model = self.config.model.as_str();
        let max_tokens = self.config.max_tokens;

        match self.config.name {
            ProviderName::Anthropic => {
                let client: providers::anthropic::Client = providers::anthropic::Client::builder()
                    .api_key(api_key)
                    .build()
                    .map_err(|e| {
                        ProviderError::ApiError(format!("failed to create Anthropic client: {e}"))
                    })?;
                prompt_simple!(client, model, max_tokens, system, prompt, "Anthropic")
            }
            ProviderName::OpenAI => {
                let client =
                    self.build_openai_client(api_key, self.config.base_url.as_deref(), "OpenAI")?;
                prompt_simple!(client, model, max_tokens, system, prompt, "OpenAI")
            }
            ProviderName::Gemini => {
                let client = new_client!(providers::gemini::Client, api_key, "Gemini")?;
                prompt_simple!(client, model, max_tokens, system, prompt, "Gemini")
            }
            ProviderName::DeepSeek => {
                let client = new_client!(providers::deepseek::Client, api_key, "DeepSeek")?;
                prompt_simple!(client, model, max_tokens, system, prompt, "DeepSeek")
            }
            ProviderName::Groq => {
                let client = new_client!(providers::groq::Client, api_key, "Groq")?;
                prompt_simple!(client, model, max_tokens, system, prompt, "Groq")
            }
            ProviderName::OpenAICompatible => {
                let base_url = self.require_base_url()?;
                let client =
                    self.build_openai_client(api_key, Some(base_url), "OpenAI-compatible")?;
                prompt_simple!(
                    client,
                    model,
                    max_tokens,
                    system,
                    prompt,
                    "OpenAI-compatible"
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(name: ProviderName, api_key: Option<&str>, base_url: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            name,
            api_key: api_key.map(str::to_string),
            base_url: base_url.map(str::to_string),
            ..ProviderConfig::default()
        }
    }

    #[test]
    fn new_provider_missing_api_key() {
        match RigProvider::new(config(ProviderName::Anthropic, None, None)) {
            Err(e) => {
                let msg = e.to_string();
                assert!(msg.contains("API key"), "got: {msg}");
                assert!(msg.contains("ANTHROPIC_API_KEY"), "got: {msg}");
            }
            Ok(_) => panic!("expected error for missing API key"),
        }
    }

    #[test]
    fn new_provider_with_api_key() {
        let provider = RigProvider::new(config(ProviderName::Anthropic, Some("sk-test"), None))
            .unwrap();
        assert_eq!(provider.model(), "claude-3-7-sonnet-latest");
    }

    #[test]
    fn openai_compatible_requires_base_url() {
        let result = RigProvider::new(config(ProviderName::OpenAICompatible, Some("k"), None));
        match result {
            Err(e) => assert!(e.to_string().contains("base_url"), "got: {e}"),
            Ok(_) => panic!("expected error for missing base_url"),
        }
    }

    #[test]
    fn openai_compatible_with_base_url() {
        let result = RigProvider::new(config(
            ProviderName::OpenAICompatible,
            Some("k"),
            Some("http://localhost:11434/v1"),
        ));
        assert!(result.is_ok());
    }
}
