/*!
 * Provider implementations for different text generation services.
 *
 * This module contains client implementations for various LLM providers:
 * - Ollama: Local LLM server
 * - OpenAI: OpenAI API integration (also used for LM Studio)
 * - Anthropic: Anthropic API integration
 * - Mock: scripted provider for tests
 */

use async_trait::async_trait;
use log::{debug, warn};
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::errors::ProviderError;

/// A provider-neutral completion request
#[derive(Debug, Clone)]
pub struct CompletionPrompt {
    /// Model name
    pub model: String,
    /// System prompt guiding the model
    pub system: String,
    /// User message
    pub user: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum number of tokens to generate
    pub max_tokens: u32,
    /// Ask the provider to constrain its answer to JSON when it can
    pub json_output: bool,
}

/// Text returned by a provider plus token accounting when available
#[derive(Debug, Clone, Default)]
pub struct Completion {
    /// Generated text
    pub text: String,
    /// Prompt tokens consumed
    pub prompt_tokens: Option<u64>,
    /// Completion tokens produced
    pub completion_tokens: Option<u64>,
}

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the generation gateway.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a prompt using this provider
    ///
    /// # Arguments
    /// * `prompt` - The prompt to complete
    ///
    /// # Returns
    /// * `Result<Completion, ProviderError>` - The completion or an error
    async fn complete(&self, prompt: CompletionPrompt) -> Result<Completion, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Human readable provider name for logs
    fn name(&self) -> &str;
}

/// Retry and pacing settings shared by the HTTP clients
///
/// Clones share the time of the last request, so every client built from
/// one policy is paced together.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts after the first request
    pub max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    pub backoff_base_ms: u64,
    /// Optional rate limit in requests per minute
    pub rate_limit: Option<u32>,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(0, 1000, None)
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_base_ms: u64, rate_limit: Option<u32>) -> Self {
        Self {
            max_retries,
            backoff_base_ms,
            rate_limit,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(1u64 << exponent))
    }

    /// Minimum gap between two requests, if a rate limit is set
    pub fn request_interval(&self) -> Option<Duration> {
        self.rate_limit
            .filter(|r| *r > 0)
            .map(|r| Duration::from_millis(60_000 / u64::from(r)))
    }

    /// Wait until the rate limit allows another request and record it
    async fn pace(&self, provider_name: &str) {
        let Some(interval) = self.request_interval() else {
            return;
        };

        // Held across the sleep so concurrent callers queue up
        let mut last_request = self.last_request.lock().await;
        if let Some(previous) = *last_request {
            let ready_at = previous + interval;
            if ready_at > Instant::now() {
                debug!(
                    "{} rate limit: waiting {:?} before the next request",
                    provider_name,
                    ready_at - Instant::now()
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last_request = Some(Instant::now());
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error
    /// or the retry budget is spent
    pub async fn run<T, F, Fut>(&self, provider_name: &str, mut operation: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt = 0;
        loop {
            self.pace(provider_name).await;
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        "{} request failed: {} - retry {}/{}",
                        provider_name, e, attempt, self.max_retries
                    );
                    tokio::time::sleep(self.backoff(attempt)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Read a failed HTTP response into a typed error
pub(crate) async fn error_from_response(provider_name: &str, response: reqwest::Response) -> ProviderError {
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());
    log::error!("{} API error ({}): {}", provider_name, status, error_text);
    ProviderError::from_status(status.as_u16(), error_text)
}

/// Convert a reqwest send failure into a typed error
pub(crate) fn error_from_send(provider_name: &str, error: reqwest::Error) -> ProviderError {
    if error.is_timeout() || error.is_connect() {
        ProviderError::ConnectionError(format!("{}: {}", provider_name, error))
    } else {
        ProviderError::RequestFailed(format!("{}: {}", provider_name, error))
    }
}

pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod openai;
