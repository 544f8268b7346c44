/*!
 * Parsing of model answers into sentence lists.
 *
 * Models are asked for a bare JSON array of strings, but in practice they
 * also wrap it in an object (`{"sentences": [...]}`, which JSON mode on
 * some providers forces) or in a Markdown code fence.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

// @const: Markdown code fence, optionally tagged
static CODE_FENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[a-zA-Z]*\s*(.*?)\s*```").expect("valid code fence regex"));

/// The model answer did not have the expected shape
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OutputError {
    #[error("model returned an empty answer")]
    Empty,

    #[error("model answer is not a JSON list of strings: {0}")]
    Malformed(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SentencePayload {
    List(Vec<String>),
    Wrapped { sentences: Vec<String> },
}

/// Extract the ordered sentence list from a model answer.
///
/// Order and content are kept exactly as returned; blank entries are left for
/// the sentence store to drop.
pub fn parse_sentences(raw: &str) -> Result<Vec<String>, OutputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(OutputError::Empty);
    }

    let body = CODE_FENCE_REGEX
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map_or(trimmed, |m| m.as_str());

    match serde_json::from_str::<SentencePayload>(body) {
        Ok(SentencePayload::List(sentences)) | Ok(SentencePayload::Wrapped { sentences }) => Ok(sentences),
        Err(e) => Err(OutputError::Malformed(e.to_string())),
    }
}
