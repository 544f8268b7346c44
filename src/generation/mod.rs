/*!
 * Dictation sentence generation.
 *
 * This module turns a teacher's request into a list of sentences produced by
 * an AI provider. It is split into several submodules:
 *
 * - `request`: Form input, validated request and proficiency levels
 * - `prompts`: Prompt construction for the provider
 * - `output`: Parsing and validation of the model answer
 * - `gateway`: The generation entry point and its failure type
 */

// Re-export main types for easier usage
pub use self::gateway::{FailureKind, GenerationFailure, GenerationGateway, GenerationResult};
pub use self::request::{
    GenerationInput, GenerationRequest, ProficiencyLevel, MAX_GRADE_LEVEL, MAX_SENTENCES, MIN_GRADE_LEVEL,
    MIN_SENTENCES,
};

// Submodules
pub mod gateway;
pub mod output;
pub mod prompts;
pub mod request;
