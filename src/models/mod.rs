//! Shared types used across all modules.
//!
//! This module defines the core data structures for patch locations,
//! model replies, pull request metadata and run summaries. Other modules import from
//! here rather than reaching into each other's internals.

pub mod analysis;
pub mod patch;
pub mod pull_request;
pub mod summary;

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use analysis::{
    AnalysisResult, CodeReviewResult, GeneratedTest, ReviewIssue, TestFileMapping,
    TestImplementationResult, TestMappingResult, TestSuggestion, TestSuggestionResult,
};
pub use patch::LineLocation;
pub use pull_request::{ChangedFile, FileStatus, PullRequestRef, ReviewComment};
pub use summary::RunSummary;

/// What the test writer does with the model's output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TestMode {
    /// Post test suggestions as review comments.
    #[default]
    Suggest,
    /// Write generated tests into the working tree.
    Implement,
}

impl fmt::Display for TestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestMode::Suggest => write!(f, "suggest"),
            TestMode::Implement => write!(f, "implement"),
        }
    }
}

/// Supported LLM provider backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    #[default]
    Anthropic,
    #[serde(rename = "openai")]
    OpenAI,
    Gemini,
    #[serde(rename = "deepseek")]
    DeepSeek,
    Groq,
    /// Any OpenAI-compatible API (e.g. Ollama, Together, local servers).
    #[serde(rename = "openai-compatible")]
    OpenAICompatible,
}

impl ProviderName {
    pub const ALL: [ProviderName; 6] = [
        ProviderName::Anthropic,
        ProviderName::OpenAI,
        ProviderName::Gemini,
        ProviderName::DeepSeek,
        ProviderName::Groq,
        ProviderName::OpenAICompatible,
    ];

    /// Name used in config files and `PRBOT_PROVIDER`.
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderName::Anthropic => "anthropic",
            ProviderName::OpenAI => "openai",
            ProviderName::Gemini => "gemini",
            ProviderName::DeepSeek => "deepseek",
            ProviderName::Groq => "groq",
            ProviderName::OpenAICompatible => "openai-compatible",
        }
    }

    /// Variable holding this provider's API key when `PRBOT_API_KEY` is unset.
    pub fn api_key_env_var(self) -> &'static str {
        match self {
            ProviderName::Anthropic => "ANTHROPIC_API_KEY",
            ProviderName::OpenAI | ProviderName::OpenAICompatible => "OPENAI_API_KEY",
            ProviderName::Gemini => "GEMINI_API_KEY",
            ProviderName::DeepSeek => "DEEPSEEK_API_KEY",
            ProviderName::Groq => "GROQ_API_KEY",
        }
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|n| n.as_str()).collect();
                format!("unsupported provider '{s}', expected one of: {}", known.join(", "))
            })
    }
}
