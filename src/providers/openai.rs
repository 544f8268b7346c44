use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Completion, CompletionPrompt, Provider, RetryPolicy, error_from_response, error_from_send};
use crate::errors::ProviderError;

/// OpenAI client for the chat completions API.
///
/// Also serves OpenAI-compatible local servers such as LM Studio.
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL, e.g. `https://api.openai.com/v1`
    endpoint: String,
    /// Retry behaviour for failed requests
    retry: RetryPolicy,
    /// Name used in logs
    display_name: String,
}

/// Chat completion request
#[derive(Debug, Serialize, Default)]
pub struct OpenAIRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<OpenAIMessage>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,

    /// Output format constraint
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

/// Response format selector
#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

/// Chat message format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct OpenAIUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// One completion choice
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIMessage,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    pub choices: Vec<OpenAIChoice>,
    #[serde(default)]
    pub usage: Option<OpenAIUsage>,
}

impl OpenAIRequest {
    /// Create a new chat completion request
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(OpenAIMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum number of tokens
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Request a JSON object answer
    pub fn json_object(mut self) -> Self {
        self.response_format = Some(ResponseFormat {
            format_type: "json_object".to_string(),
        });
        self
    }
}

impl OpenAI {
    /// Create a new OpenAI client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::new_with_config(api_key, endpoint, RetryPolicy::default(), 60)
    }

    /// Create a new OpenAI client with retry and timeout settings
    pub fn new_with_config(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        retry: RetryPolicy,
        timeout_secs: u64,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            retry,
            display_name: "OpenAI".to_string(),
        }
    }

    /// Rename the client in logs, e.g. for LM Studio
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    fn api_url(&self) -> String {
        if self.endpoint.is_empty() {
            "https://api.openai.com/v1/chat/completions".to_string()
        } else {
            format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
        }
    }

    /// Complete a chat request
    pub async fn chat(&self, request: &OpenAIRequest) -> Result<OpenAIResponse, ProviderError> {
        let api_url = self.api_url();
        let api_url = api_url.as_str();
        let client = &self.client;
        let api_key = self.api_key.as_str();
        let name = self.display_name.as_str();

        self.retry
            .run(name, move || async move {
                let response = client
                    .post(api_url)
                    .bearer_auth(api_key)
                    .json(request)
                    .send()
                    .await
                    .map_err(|e| error_from_send(name, e))?;

                if !response.status().is_success() {
                    return Err(error_from_response(name, response).await);
                }

                response
                    .json::<OpenAIResponse>()
                    .await
                    .map_err(|e| ProviderError::ParseError(format!("Failed to parse {} response: {}", name, e)))
            })
            .await
    }

    /// Extract text from the first choice
    pub fn extract_text_from_response(response: &OpenAIResponse) -> Option<String> {
        response.choices.first().map(|c| c.message.content.clone())
    }
}

#[async_trait]
impl Provider for OpenAI {
    async fn complete(&self, prompt: CompletionPrompt) -> Result<Completion, ProviderError> {
        let mut request = OpenAIRequest::new(prompt.model)
            .add_message("system", prompt.system)
            .add_message("user", prompt.user)
            .temperature(prompt.temperature)
            .max_tokens(prompt.max_tokens);
        if prompt.json_output {
            request = request.json_object();
        }

        let response = self.chat(&request).await?;
        let text = Self::extract_text_from_response(&response)
            .ok_or_else(|| ProviderError::ParseError(format!("{} returned no choices", self.display_name)))?;

        Ok(Completion {
            text,
            prompt_tokens: response.usage.as_ref().map(|u| u64::from(u.prompt_tokens)),
            completion_tokens: response.usage.as_ref().map(|u| u64::from(u.completion_tokens)),
        })
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = format!("{}/models", self.endpoint.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| error_from_send(&self.display_name, e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(&self.display_name, response).await)
        }
    }

    fn name(&self) -> &str {
        &self.display_name
    }
}
