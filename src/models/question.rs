// src/models/question.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Fixed subject set covered by the question bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    Physics,
    Chemistry,
    Biology,
    Mathematics,
}

impl Subject {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Physics => "Physics",
            Subject::Chemistry => "Chemistry",
            Subject::Biology => "Biology",
            Subject::Mathematics => "Mathematics",
        }
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "physics" => Ok(Subject::Physics),
            "chemistry" => Ok(Subject::Chemistry),
            "biology" => Ok(Subject::Biology),
            "mathematics" | "maths" | "math" => Ok(Subject::Mathematics),
            other => Err(format!("Unknown subject: {}", other)),
        }
    }
}

/// Difficulty band of a question, used for assembly quotas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("Unknown difficulty: {}", other)),
        }
    }
}

/// Question kind. Only multiple choice is modeled today; the enum leaves room
/// for other kinds without changing the stored shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QuestionKind {
    #[default]
    #[serde(rename = "Multiple Choice", alias = "multiple_choice", alias = "MCQ")]
    MultipleChoice,
}

/// A single bank item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: uuid::Uuid,

    /// The question statement.
    pub text: String,

    pub kind: QuestionKind,

    /// Ordered option texts. Non-empty for choice kinds.
    pub options: Vec<String>,

    /// Canonical answer. When options are present this must equal one of
    /// them under normalized comparison (see `answer_matches_options`).
    pub answer: String,

    pub explanation: Option<String>,

    pub subject: Subject,

    /// Free-text topic within the subject.
    pub topic: String,

    pub difficulty: Difficulty,

    pub marks: u32,

    /// A flagged question is excluded from every eligibility computation
    /// until explicitly unflagged.
    pub flagged: bool,
    pub flag_reason: Option<String>,

    /// Inline vector markup, sanitized at ingestion.
    pub diagram_svg: Option<String>,

    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

pub fn default_marks() -> u32 {
    4
}

/// DTO for adding a question to the bank.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(custom(function = validate_not_blank), length(max = 4000))]
    pub text: String,

    #[serde(default)]
    pub kind: QuestionKind,

    #[validate(custom(function = validate_option_list))]
    #[serde(default)]
    pub options: Vec<String>,

    #[validate(custom(function = validate_not_blank), length(max = 1000))]
    pub answer: String,

    #[validate(length(max = 4000))]
    pub explanation: Option<String>,

    pub subject: Subject,

    #[validate(length(max = 200))]
    #[serde(default)]
    pub topic: String,

    pub difficulty: Difficulty,

    #[serde(default = "default_marks")]
    #[validate(range(min = 1))]
    pub marks: u32,

    pub diagram_svg: Option<String>,
}

/// DTO for editing a question. Fields are optional; present fields are merged
/// and the merged record is re-validated under the ingestion rules.
#[derive(Debug, Deserialize)]
pub struct UpdateQuestionRequest {
    pub text: Option<String>,
    pub options: Option<Vec<String>>,
    pub answer: Option<String>,
    pub explanation: Option<String>,
    pub subject: Option<Subject>,
    pub topic: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub marks: Option<u32>,
    pub diagram_svg: Option<String>,
}

/// DTO for flagging a question. The reason is a required field; an empty
/// string is accepted but the curation UI always prompts for one.
#[derive(Debug, Deserialize)]
pub struct FlagRequest {
    pub reason: String,
}

fn validate_not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

fn validate_option_list(options: &[String]) -> Result<(), validator::ValidationError> {
    for opt in options {
        if opt.trim().is_empty() {
            return Err(validator::ValidationError::new("blank_option"));
        }
        if opt.len() > 1000 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}

/// Normalization applied before answer/option equality: trim and case-fold.
/// The stored strings are never rewritten, only the comparison is relaxed.
pub fn normalize_answer(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Whether `answer` matches one of `options` under normalized comparison.
/// Answer-by-string-equality is the contract the AI collaborator can
/// actually honor; stable option indices are not.
pub fn answer_matches_options(answer: &str, options: &[String]) -> bool {
    let wanted = normalize_answer(answer);
    options.iter().any(|opt| normalize_answer(opt) == wanted)
}
