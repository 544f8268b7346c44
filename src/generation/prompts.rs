/*!
 * Prompt templates for dictation sentence generation.
 */

use super::request::GenerationRequest;

/// Soft upper bound on sentence length the model is asked to respect
pub const MAX_SENTENCE_CHARS: usize = 11;

/// User prompt template for sentence generation.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default instructions for dictation sentences.
    pub const DICTATION_SENTENCES: &'static str = r#"Generate {number_of_sentences} dictation sentences for grade level {grade_level} students.
The dictation goal is: {dictation_goal}.
The proficiency level is: {proficiency_level}.

Sentences must be grammatically correct and make sense.
Each sentence must be {max_chars} characters or less.
Sentences should be interesting and engaging for young students.
Sentences should not include any harmful or inappropriate content.

Return a JSON array of strings representing the sentences. For example:
["Sentence 1.", "Sentence 2.", "Sentence 3."]"#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default dictation template.
    pub fn dictation_sentences() -> Self {
        Self::new(Self::DICTATION_SENTENCES)
    }

    /// Render the template for a request.
    pub fn render(&self, request: &GenerationRequest) -> String {
        self.template
            .replace("{number_of_sentences}", &request.number_of_sentences().to_string())
            .replace("{grade_level}", &request.grade_level().to_string())
            .replace("{dictation_goal}", request.dictation_goal())
            .replace("{proficiency_level}", request.proficiency_level().label())
            .replace("{max_chars}", &MAX_SENTENCE_CHARS.to_string())
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::dictation_sentences()
    }
}
