/*!
 * Error types for the dictsheet application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether sending the same request again may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }

    /// Map a non-success HTTP status to the matching variant
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

/// A generation request field that failed validation.
///
/// The display text is the message shown next to the offending form field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("학년을 선택해주세요.")]
    GradeLevel,

    #[error("받아쓰기 목표를 입력해주세요.")]
    DictationGoal,

    #[error("성취 수준을 선택해주세요.")]
    ProficiencyLevel,

    #[error("1에서 20 사이의 숫자를 입력해주세요.")]
    NumberOfSentences,
}

/// Errors raised by the sentence store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Position does not name an existing sentence
    #[error("Sentence position {position} is out of range (store holds {len} sentences)")]
    OutOfRange {
        /// Requested 0-based position
        position: usize,
        /// Store length at the time of the request
        len: usize,
    },
}

/// Errors that can occur while exporting a worksheet page
#[derive(Error, Debug)]
pub enum ExportError {
    /// No rendered handle is bound to the requested page
    #[error("Page {0} has not been rendered yet")]
    HandleUnavailable(usize),

    /// The page markup could not be turned into pixels
    #[error("Failed to render page: {0}")]
    Render(String),

    /// The raster could not be encoded as PNG
    #[error("Failed to encode image: {0}")]
    Encode(String),

    /// The host could not store the artifact
    #[error("Failed to save {file_name}: {message}")]
    Save {
        /// Target filename
        file_name: String,
        /// Underlying cause
        message: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the sentence store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Error from exporting
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Configuration problem
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
