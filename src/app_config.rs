use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;

use crate::generation::{GenerationInput, GenerationRequest, ProficiencyLevel};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Sentence generation config
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Worksheet rendering and export config
    #[serde(default)]
    pub worksheet: WorksheetConfig,

    /// Values the generation form starts with
    #[serde(default)]
    pub form_defaults: FormDefaults,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Generation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GenerationProvider {
    // @provider: Ollama
    #[default]
    Ollama,
    // @provider: OpenAI
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl GenerationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }

    /// Hosted providers refuse requests without a key
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI | Self::Anthropic)
    }
}

impl std::fmt::Display for GenerationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for GenerationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Rate limit (requests per minute)
    #[serde(default)]
    pub rate_limit: Option<u32>,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: GenerationProvider) -> Self {
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model: default_model(&provider_type),
            api_key: String::new(),
            endpoint: default_endpoint(&provider_type),
            timeout_secs: default_timeout_secs(),
            rate_limit: default_rate_limit(&provider_type),
        }
    }
}

/// Sentence generation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerationConfig {
    /// Generation provider to use
    #[serde(default)]
    pub provider: GenerationProvider,

    /// Available generation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common generation settings
    #[serde(default)]
    pub common: GenerationCommonConfig,
}

/// Common generation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerationCommonConfig {
    /// System prompt sent ahead of every generation request
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Retry count for failed requests.
    /// Zero keeps a single HTTP request per generation.
    #[serde(default)]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on generated tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for GenerationCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            retry_count: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Worksheet layout and export settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WorksheetConfig {
    /// Heading printed on every page
    #[serde(default = "default_title")]
    pub title: String,

    /// Exported filename without extension or page suffix
    #[serde(default = "default_base_file_name")]
    pub base_file_name: String,

    /// Sentences per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Device pixels per layout unit in exported images
    #[serde(default = "default_pixel_ratio")]
    pub pixel_ratio: f32,

    /// Where exported images go; the download directory when unset
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Font family used for all worksheet text
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Extra font file to load before rendering
    #[serde(default)]
    pub font_path: Option<PathBuf>,

    /// Whether to scan installed system fonts
    #[serde(default = "default_true")]
    pub load_system_fonts: bool,
}

impl Default for WorksheetConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            base_file_name: default_base_file_name(),
            page_size: default_page_size(),
            pixel_ratio: default_pixel_ratio(),
            output_dir: None,
            font_family: default_font_family(),
            font_path: None,
            load_system_fonts: true,
        }
    }
}

impl WorksheetConfig {
    /// Resolve the export directory
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Initial values of the generation form
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FormDefaults {
    #[serde(default = "default_grade_level")]
    pub grade_level: u8,

    #[serde(default = "default_dictation_goal")]
    pub dictation_goal: String,

    #[serde(default)]
    pub proficiency_level: ProficiencyLevel,

    #[serde(default = "default_number_of_sentences")]
    pub number_of_sentences: u32,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            grade_level: default_grade_level(),
            dictation_goal: default_dictation_goal(),
            proficiency_level: ProficiencyLevel::default(),
            number_of_sentences: default_number_of_sentences(),
        }
    }
}

impl FormDefaults {
    /// The form input these defaults describe
    pub fn to_input(&self) -> GenerationInput {
        GenerationInput {
            grade_level: self.grade_level.to_string(),
            dictation_goal: self.dictation_goal.clone(),
            proficiency_level: self.proficiency_level.label().to_string(),
            number_of_sentences: i64::from(self.number_of_sentences),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_true() -> bool {
    true
}

fn default_title() -> String {
    "받아쓰기 시험".to_string()
}

fn default_base_file_name() -> String {
    "dictation-worksheet".to_string()
}

fn default_page_size() -> usize {
    crate::paginator::PAGE_SIZE
}

fn default_pixel_ratio() -> f32 {
    2.0
}

fn default_font_family() -> String {
    "Noto Sans CJK KR".to_string()
}

fn default_grade_level() -> u8 {
    1
}

fn default_dictation_goal() -> String {
    "받침 있는 글자".to_string()
}

fn default_number_of_sentences() -> u32 {
    5
}

fn default_endpoint(provider: &GenerationProvider) -> String {
    match provider {
        GenerationProvider::Ollama => "http://localhost:11434".to_string(),
        GenerationProvider::OpenAI => "https://api.openai.com/v1".to_string(),
        GenerationProvider::Anthropic => "https://api.anthropic.com".to_string(),
        // LM Studio default server (OpenAI compatible) runs on port 1234 under /v1
        GenerationProvider::LMStudio => "http://localhost:1234/v1".to_string(),
    }
}

fn default_model(provider: &GenerationProvider) -> String {
    match provider {
        GenerationProvider::Ollama => "llama3.1".to_string(),
        GenerationProvider::OpenAI => "gpt-4o-mini".to_string(),
        GenerationProvider::Anthropic => "claude-3-haiku-20240307".to_string(),
        // Placeholder; users should set to the loaded model name in LM Studio
        GenerationProvider::LMStudio => "local-model".to_string(),
    }
}

fn default_rate_limit(provider: &GenerationProvider) -> Option<u32> {
    match provider {
        GenerationProvider::OpenAI => Some(60),
        GenerationProvider::Anthropic => Some(45),
        // Local servers are not rate limited
        GenerationProvider::Ollama | GenerationProvider::LMStudio => None,
    }
}

fn default_system_prompt() -> String {
    "You are an AI assistant helping elementary school teachers create Korean dictation exercises.".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let provider = &self.generation.provider;
        if provider.requires_api_key() && self.generation.get_api_key().is_empty() {
            return Err(anyhow!(
                "Generation API key is required for {} provider",
                provider.display_name()
            ));
        }

        if self.worksheet.page_size == 0 {
            return Err(anyhow!("worksheet.page_size must be at least 1"));
        }

        if !(self.worksheet.pixel_ratio.is_finite() && self.worksheet.pixel_ratio > 0.0) {
            return Err(anyhow!(
                "worksheet.pixel_ratio must be positive, got {}",
                self.worksheet.pixel_ratio
            ));
        }

        if self.worksheet.base_file_name.trim().is_empty() {
            return Err(anyhow!("worksheet.base_file_name cannot be empty"));
        }

        GenerationRequest::try_from(&self.form_defaults.to_input())
            .map_err(|e| anyhow!("Invalid form_defaults: {}", e))?;

        Ok(())
    }
}

impl GenerationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &GenerationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to the active provider configuration, created on demand
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        if let Some(index) = self
            .available_providers
            .iter()
            .position(|p| p.provider_type == provider_str)
        {
            return &mut self.available_providers[index];
        }
        self.available_providers
            .push(ProviderConfig::new(self.provider.clone()));
        let last = self.available_providers.len() - 1;
        &mut self.available_providers[last]
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.model.clone())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| default_model(&self.provider))
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.endpoint.clone())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| default_endpoint(&self.provider))
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|t| *t > 0)
            .unwrap_or_else(default_timeout_secs)
    }

    /// Get the rate limit for the active provider
    pub fn get_rate_limit(&self) -> Option<u32> {
        match self.get_active_provider_config() {
            Some(provider_config) => provider_config.rate_limit,
            None => default_rate_limit(&self.provider),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: GenerationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(GenerationProvider::Ollama),
                ProviderConfig::new(GenerationProvider::OpenAI),
                ProviderConfig::new(GenerationProvider::Anthropic),
                ProviderConfig::new(GenerationProvider::LMStudio),
            ],
            common: GenerationCommonConfig::default(),
        }
    }
}
