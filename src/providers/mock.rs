/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Answers with a JSON array of the requested size
 * - `MockProvider::malformed()` - Answers with text that is not a sentence list
 * - `MockProvider::failing()` - Always fails with an error
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::ProviderError;
use crate::providers::{Completion, CompletionPrompt, Provider};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Answers with `count` numbered sentences, `count` read from the prompt
    Working,
    /// Always answers with the given sentences
    Fixed(Vec<String>),
    /// Answers with prose instead of JSON
    Malformed,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Returns empty response
    Empty,
    /// Simulates slow response
    Slow { delay_ms: u64 },
}

/// Mock provider for testing generation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter shared between clones
    request_count: Arc<AtomicUsize>,
    /// Last prompt received
    last_prompt: Arc<Mutex<Option<CompletionPrompt>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            last_prompt: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock provider that always returns these sentences
    pub fn fixed<S: Into<String>>(sentences: impl IntoIterator<Item = S>) -> Self {
        Self::new(MockBehavior::Fixed(sentences.into_iter().map(Into::into).collect()))
    }

    /// Create a mock that answers with non-JSON text
    pub fn malformed() -> Self {
        Self::new(MockBehavior::Malformed)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that waits before answering
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Number of `complete` calls received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// The most recent prompt received
    pub fn last_prompt(&self) -> Option<CompletionPrompt> {
        self.last_prompt.lock().ok().and_then(|p| p.clone())
    }

    /// Build a JSON array answer holding `count` numbered sentences
    pub fn generate_sentence_array(count: usize) -> String {
        let sentences: Vec<String> = (1..=count).map(|i| format!("문장 {}.", i)).collect();
        serde_json::to_string(&sentences).unwrap_or_else(|_| "[]".to_string())
    }

    /// Read the requested sentence count back out of a prompt
    fn requested_count(prompt: &CompletionPrompt) -> usize {
        prompt
            .user
            .split_whitespace()
            .skip_while(|word| *word != "Generate")
            .nth(1)
            .and_then(|n| n.parse().ok())
            .unwrap_or(1)
    }

    fn completion(text: String) -> Completion {
        Completion {
            text,
            prompt_tokens: Some(10),
            completion_tokens: Some(10),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, prompt: CompletionPrompt) -> Result<Completion, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.clone());
        }

        match &self.behavior {
            MockBehavior::Working => Ok(Self::completion(Self::generate_sentence_array(Self::requested_count(&prompt)))),

            MockBehavior::Fixed(sentences) => Ok(Self::completion(
                serde_json::to_string(sentences).map_err(|e| ProviderError::ParseError(e.to_string()))?,
            )),

            MockBehavior::Malformed => Ok(Self::completion("Here are some sentences: the cat sat.".to_string())),

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(Self::completion(Self::generate_sentence_array(Self::requested_count(&prompt))))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Empty => Ok(Completion::default()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(*delay_ms)).await;
                Ok(Self::completion(Self::generate_sentence_array(Self::requested_count(&prompt))))
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated outage".to_string())),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "Mock"
    }
}
