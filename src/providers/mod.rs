//! CompletionProvider trait and LLM integration.
//!
//! Provides an abstraction layer over rig-core so the pipelines only see
//! "system prompt + user prompt in, text out".

pub mod response;
pub mod retry;
pub mod rig;

use async_trait::async_trait;
use thiserror::Error;

pub use response::{extract_json, parse_analysis};
pub use retry::{RetryPolicy, complete_with_retry};

/// Errors from the completion provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("LLM API error: {0}")]
    ApiError(String),

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

/// Trait for a language model that answers a single prompt with text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send `prompt` with the given system preamble and return the raw reply.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, ProviderError>;
}
