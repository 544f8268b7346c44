/*!
 * Generation gateway.
 *
 * Converts a validated request into generated sentences through the
 * configured provider. Every failure comes back as a `GenerationFailure`
 * carrying the message shown to the teacher; nothing here panics or
 * propagates provider errors directly.
 */

use anyhow::{anyhow, Result};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use url::Url;

use super::output::parse_sentences;
use super::prompts::PromptTemplate;
use super::request::{GenerationInput, GenerationRequest};
use crate::app_config::{GenerationConfig, GenerationProvider};
use crate::errors::{ProviderError, ValidationError};
use crate::providers::anthropic::Anthropic;
use crate::providers::ollama::Ollama;
use crate::providers::openai::OpenAI;
use crate::providers::{CompletionPrompt, Provider, RetryPolicy};

/// Outcome of one generation: the sentences in model order, or a failure
pub type GenerationResult = Result<Vec<String>, GenerationFailure>;

/// Where a generation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request was rejected locally; no provider call was made
    Validation,
    /// The provider call failed or its answer was unusable
    Generation,
}

/// A failed generation with its user-facing message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct GenerationFailure {
    /// Failure category
    pub kind: FailureKind,
    /// Message shown to the teacher
    pub message: String,
    /// Technical cause, for logs
    pub detail: Option<String>,
}

impl GenerationFailure {
    /// Shown when the request itself is invalid
    pub const VALIDATION_MESSAGE: &'static str = "잘못된 입력입니다.";
    /// Shown when the provider could not produce sentences
    pub const GENERATION_MESSAGE: &'static str = "AI 문장 생성에 실패했습니다. 다시 시도해 주세요.";

    pub fn validation(error: ValidationError) -> Self {
        Self {
            kind: FailureKind::Validation,
            message: format!("{} {}", Self::VALIDATION_MESSAGE, error),
            detail: Some(format!("{:?}", error)),
        }
    }

    pub fn generation(detail: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Generation,
            message: Self::GENERATION_MESSAGE.to_string(),
            detail: Some(detail.into()),
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind == FailureKind::Validation
    }
}

impl From<ValidationError> for GenerationFailure {
    fn from(error: ValidationError) -> Self {
        Self::validation(error)
    }
}

impl From<ProviderError> for GenerationFailure {
    fn from(error: ProviderError) -> Self {
        Self::generation(error.to_string())
    }
}

/// Split an endpoint into scheme-qualified host and port
fn parse_endpoint(endpoint: &str) -> Result<(String, u16)> {
    if endpoint.is_empty() {
        return Err(anyhow!("Endpoint cannot be empty"));
    }

    let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Url::parse(endpoint)?
    } else {
        Url::parse(&format!("http://{}", endpoint))?
    };

    let host = url
        .host_str()
        .ok_or_else(|| anyhow!("Invalid host in endpoint: {}", endpoint))?;
    let port = url.port_or_known_default().unwrap_or(80);

    Ok((format!("{}://{}", url.scheme(), host), port))
}

/// Build the HTTP client for the configured provider
fn build_provider(config: &GenerationConfig) -> Result<Arc<dyn Provider>> {
    let retry = RetryPolicy::new(
        config.common.retry_count,
        config.common.retry_backoff_ms,
        config.get_rate_limit(),
    );
    let timeout_secs = config.get_timeout_secs();

    let provider: Arc<dyn Provider> = match config.provider {
        GenerationProvider::Ollama => {
            let (host, port) = parse_endpoint(&config.get_endpoint())?;
            Arc::new(Ollama::new_with_config(host, port, retry, timeout_secs))
        }
        GenerationProvider::OpenAI => Arc::new(OpenAI::new_with_config(
            config.get_api_key(),
            config.get_endpoint(),
            retry,
            timeout_secs,
        )),
        GenerationProvider::LMStudio => {
            // LM Studio often doesn't require an API key; use a default if empty
            let api_key = Some(config.get_api_key())
                .filter(|k| !k.is_empty())
                .unwrap_or_else(|| "lm-studio".to_string());
            Arc::new(
                OpenAI::new_with_config(api_key, config.get_endpoint(), retry, timeout_secs)
                    .with_display_name("LM Studio"),
            )
        }
        GenerationProvider::Anthropic => Arc::new(Anthropic::new_with_config(
            config.get_api_key(),
            config.get_endpoint(),
            retry,
            timeout_secs,
        )),
    };

    Ok(provider)
}

/// Boundary between the worksheet and the text generation provider
#[derive(Debug, Clone)]
pub struct GenerationGateway {
    /// Provider that answers prompts
    provider: Arc<dyn Provider>,
    /// Model name passed with every prompt
    model: String,
    /// System prompt passed with every prompt
    system_prompt: String,
    /// Sampling temperature
    temperature: f32,
    /// Token cap per answer
    max_tokens: u32,
    /// User prompt template
    template: PromptTemplate,
}

impl GenerationGateway {
    /// Create a gateway talking to the provider named in the configuration
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        Ok(Self::with_provider(build_provider(config)?, config))
    }

    /// Create a gateway around an existing provider
    pub fn with_provider(provider: Arc<dyn Provider>, config: &GenerationConfig) -> Self {
        Self {
            provider,
            model: config.get_model(),
            system_prompt: config.common.system_prompt.clone(),
            temperature: config.common.temperature,
            max_tokens: config.common.max_tokens,
            template: PromptTemplate::default(),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The prompt that `generate` would send for this request
    pub fn build_prompt(&self, request: &GenerationRequest) -> CompletionPrompt {
        CompletionPrompt {
            model: self.model.clone(),
            system: self.system_prompt.clone(),
            user: self.template.render(request),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            json_output: true,
        }
    }

    /// Validate raw form input, then generate.
    ///
    /// Invalid input fails before the provider is contacted.
    pub async fn submit(&self, input: &GenerationInput) -> GenerationResult {
        let request = GenerationRequest::try_from(input).map_err(|e| {
            warn!("Rejected generation request: {}", e);
            GenerationFailure::validation(e)
        })?;
        self.generate(&request).await
    }

    /// Ask the provider for sentences; exactly one provider call per invocation.
    ///
    /// The returned order is the provider's order. The sentence count is
    /// advisory: a shorter or longer list is still a success.
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        let start_time = Instant::now();
        debug!(
            "Requesting {} sentences from {} ({})",
            request.number_of_sentences(),
            self.provider.name(),
            self.model
        );

        let completion = self.provider.complete(self.build_prompt(request)).await.map_err(|e| {
            error!("{} generation error: {}", self.provider.name(), e);
            GenerationFailure::from(e)
        })?;

        let sentences = parse_sentences(&completion.text).map_err(|e| {
            error!("Unusable answer from {}: {}", self.provider.name(), e);
            GenerationFailure::generation(e.to_string())
        })?;

        let requested = request.number_of_sentences() as usize;
        if sentences.len() != requested {
            warn!(
                "Requested {} sentences but {} returned {}",
                requested,
                self.provider.name(),
                sentences.len()
            );
        }

        info!(
            "Generated {} sentences in {:.1}s{}",
            sentences.len(),
            start_time.elapsed().as_secs_f64(),
            completion
                .completion_tokens
                .map(|t| format!(" ({} tokens)", t))
                .unwrap_or_default()
        );

        Ok(sentences)
    }

    /// Check that the provider is reachable
    pub async fn check_connection(&self) -> Result<(), ProviderError> {
        self.provider.test_connection().await
    }
}
