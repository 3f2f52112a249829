//! Transient-error classification and retry with exponential backoff.

use std::time::Duration;

use tracing::{debug, warn};

use super::{CompletionProvider, ProviderError};

/// Maximum number of retry attempts for transient API errors.
pub const MAX_RETRIES: u32 = 5;

/// Initial backoff delay between retries.
pub const INITIAL_BACKOFF: Duration = Duration::from_secs(10);

/// Maximum backoff delay between retries.
pub const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Retry limits for model calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            initial_backoff: INITIAL_BACKOFF,
            max_backoff: MAX_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Backoff before retry number `attempt` (zero-based), doubling each
    /// time and capped at `max_backoff`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_backoff)
    }
}

/// Check whether a provider error is transient and worth retrying.
///
/// Matches HTTP status codes commonly used for rate limiting and
/// temporary unavailability: 429, 502, 503, 529, plus connection and
/// timeout failures. Configuration errors are never retried.
pub fn is_retryable(err: &ProviderError) -> bool {
    classify_error(err).is_some()
}

/// Classifies a provider error into a short, user-friendly message.
///
/// Returns `Some(message)` for transient errors, `None` otherwise.
pub fn classify_error(err: &ProviderError) -> Option<&'static str> {
    let ProviderError::ApiError(msg) = err else {
        return None;
    };
    let msg = msg.to_lowercase();
    if msg.contains("429") || msg.contains("rate limit") || msg.contains("too many requests") {
        Some("Rate limited by API")
    } else if msg.contains("503") || msg.contains("service unavailable") {
        Some("High model load")
    } else if msg.contains("529") || msg.contains("overloaded") {
        Some("API overloaded")
    } else if msg.contains("502") {
        Some("API gateway error")
    } else if msg.contains("timeout") || msg.contains("timed out") {
        Some("Request timed out")
    } else if msg.contains("connection") {
        Some("Connection error")
    } else if msg.contains("temporarily") || msg.contains("try again") {
        Some("Temporary API error")
    } else {
        None
    }
}

/// Call `provider`, retrying transient failures according to `policy`.
///
/// Non-retryable errors and the error of the final attempt are returned
/// unchanged.
pub async fn complete_with_retry(
    provider: &dyn CompletionProvider,
    system: &str,
    prompt: &str,
    policy: RetryPolicy,
) -> Result<String, ProviderError> {
    let mut attempt = 0;
    loop {
        match provider.complete(system, prompt).await {
            Ok(text) => {
                debug!(attempt, chars = text.len(), "model call succeeded");
                return Ok(text);
            }
            Err(e) if is_retryable(&e) && attempt < policy.max_retries => {
                let backoff = policy.backoff(attempt);
                let reason = classify_error(&e).unwrap_or("transient error");
                warn!(
                    attempt = attempt + 1,
                    max = policy.max_retries,
                    "{reason}, retrying in {}s",
                    backoff.as_secs()
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
