/*!
 * # dictsheet - Dictation worksheet builder
 *
 * A Rust library for assembling printable dictation worksheets from
 * AI-generated and hand-typed sentences.
 *
 * ## Features
 *
 * - Generate short dictation sentences using various AI providers:
 *   - Ollama (local LLM)
 *   - OpenAI API
 *   - Anthropic API
 *   - LM Studio (OpenAI-compatible local server)
 * - Collect generated and typed sentences into one ordered, editable list
 * - Split the list into fixed-size pages with continuous numbering
 * - Export every page as a PNG image
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `generation`: Request validation, prompting and output parsing
 * - `sentence_store`: The ordered sentence list
 * - `paginator`: Page partitioning
 * - `worksheet`: Page rendering and PNG export:
 *   - `worksheet::render`: SVG layout and rasterization
 *   - `worksheet::export`: Page handles, filenames and artifact sinks
 * - `app_controller`: Session controller tying the pieces together
 * - `commands`: Interactive session command parser
 * - `file_utils`: File system operations
 * - `providers`: Client implementations for various LLM providers:
 *   - `providers::ollama`: Ollama API client
 *   - `providers::openai`: OpenAI API client
 *   - `providers::anthropic`: Anthropic API client
 *   - `providers::mock`: Scripted provider for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod commands;
pub mod errors;
pub mod file_utils;
pub mod generation;
pub mod paginator;
pub mod providers;
pub mod sentence_store;
pub mod worksheet;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, GenerationTicket, Notice, NoticeLevel};
pub use errors::{AppError, ExportError, ProviderError, StoreError, ValidationError};
pub use generation::{GenerationFailure, GenerationGateway, GenerationInput, GenerationRequest, GenerationResult};
pub use paginator::{paginate, Page, PAGE_SIZE};
pub use sentence_store::SentenceStore;
pub use worksheet::{ArtifactSink, DirectorySink, PageHandle, WorksheetExporter};
