/*!
 * Generation request types.
 *
 * `GenerationInput` is the loosely typed shape a form submits. It only
 * becomes a `GenerationRequest` after validation, so a request that reaches a
 * provider always satisfies the grade, goal, proficiency and count bounds.
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ValidationError;

/// Lowest accepted grade level
pub const MIN_GRADE_LEVEL: u8 = 1;
/// Highest accepted grade level
pub const MAX_GRADE_LEVEL: u8 = 6;
/// Fewest sentences one request may ask for
pub const MIN_SENTENCES: u32 = 1;
/// Most sentences one request may ask for
pub const MAX_SENTENCES: u32 = 20;

/// Difficulty tier of the requested sentences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProficiencyLevel {
    #[serde(alias = "쉬움")]
    Easy,
    #[default]
    #[serde(alias = "보통")]
    Medium,
    #[serde(alias = "어려움")]
    Hard,
}

impl ProficiencyLevel {
    /// All levels, easiest first
    pub const ALL: [ProficiencyLevel; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// Label shown to teachers and sent to the model
    pub fn label(&self) -> &'static str {
        match self {
            Self::Easy => "쉬움",
            Self::Medium => "보통",
            Self::Hard => "어려움",
        }
    }
}

impl fmt::Display for ProficiencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProficiencyLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "쉬움" => Ok(Self::Easy),
            "medium" | "보통" => Ok(Self::Medium),
            "hard" | "어려움" => Ok(Self::Hard),
            _ => Err(ValidationError::ProficiencyLevel),
        }
    }
}

/// Raw form submission, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationInput {
    /// Grade as typed or selected, e.g. "3"
    pub grade_level: String,
    /// Target orthographic skill
    pub dictation_goal: String,
    /// One of easy / medium / hard, English or Korean
    pub proficiency_level: String,
    /// Requested number of sentences
    pub number_of_sentences: i64,
}

/// A request that passed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    grade_level: u8,
    dictation_goal: String,
    proficiency_level: ProficiencyLevel,
    number_of_sentences: u32,
}

impl GenerationRequest {
    /// Build a request, rejecting values outside the accepted bounds
    pub fn new(
        grade_level: u8,
        dictation_goal: impl Into<String>,
        proficiency_level: ProficiencyLevel,
        number_of_sentences: u32,
    ) -> Result<Self, ValidationError> {
        if !(MIN_GRADE_LEVEL..=MAX_GRADE_LEVEL).contains(&grade_level) {
            return Err(ValidationError::GradeLevel);
        }

        let dictation_goal = dictation_goal.into().trim().to_string();
        if dictation_goal.is_empty() {
            return Err(ValidationError::DictationGoal);
        }

        if !(MIN_SENTENCES..=MAX_SENTENCES).contains(&number_of_sentences) {
            return Err(ValidationError::NumberOfSentences);
        }

        Ok(Self {
            grade_level,
            dictation_goal,
            proficiency_level,
            number_of_sentences,
        })
    }

    pub fn grade_level(&self) -> u8 {
        self.grade_level
    }

    pub fn dictation_goal(&self) -> &str {
        &self.dictation_goal
    }

    pub fn proficiency_level(&self) -> ProficiencyLevel {
        self.proficiency_level
    }

    pub fn number_of_sentences(&self) -> u32 {
        self.number_of_sentences
    }
}

impl TryFrom<&GenerationInput> for GenerationRequest {
    type Error = ValidationError;

    fn try_from(input: &GenerationInput) -> Result<Self, Self::Error> {
        let grade_level = input
            .grade_level
            .trim()
            .parse::<u8>()
            .map_err(|_| ValidationError::GradeLevel)?;
        let proficiency_level = input.proficiency_level.parse::<ProficiencyLevel>()?;
        let number_of_sentences =
            u32::try_from(input.number_of_sentences).map_err(|_| ValidationError::NumberOfSentences)?;

        Self::new(grade_level, input.dictation_goal.as_str(), proficiency_level, number_of_sentences)
    }
}
