// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// Question kinds. Stored as the Postgres enum `question_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "question_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    DescriptiveShort,
    DescriptiveLong,
    MultipleOptions,
}

impl QuestionType {
    pub fn is_descriptive(self) -> bool {
        !matches!(self, QuestionType::MultipleOptions)
    }

    /// Maximum length of the owner's reference answer.
    pub fn reference_answer_limit(self) -> usize {
        match self {
            QuestionType::DescriptiveLong => 600,
            _ => 355,
        }
    }
}

/// The two families an answer submission is partitioned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionFamily {
    Descriptive,
    MultipleOptions,
}

impl QuestionFamily {
    pub fn contains(self, question_type: QuestionType) -> bool {
        match self {
            QuestionFamily::Descriptive => question_type.is_descriptive(),
            QuestionFamily::MultipleOptions => !question_type.is_descriptive(),
        }
    }
}

/// Represents the 'questions' table without its children.
#[derive(Debug, Clone, FromRow)]
pub struct QuestionRow {
    pub id: i64,
    pub quiz_id: i64,
    pub text: String,
    pub score: f64,
    pub question_type: QuestionType,
}

/// Represents the 'choices' table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Choice {
    pub id: i64,
    #[serde(skip)]
    pub question_id: i64,
    pub text: String,
}

/// Represents the 'reference_answers' table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ReferenceAnswer {
    pub id: i64,
    #[serde(skip)]
    pub question_id: i64,
    pub answer: Option<String>,
}

/// A question with its owned children eagerly loaded. This is the owner's view.
#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub id: i64,
    pub quiz_id: i64,
    pub text: String,
    pub score: f64,
    pub question_type: QuestionType,

    /// Descriptive questions only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<ReferenceAnswer>,

    /// Multiple-options questions only, ordered by id.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_option_id: Option<i64>,
}

impl Question {
    pub fn from_row(row: QuestionRow) -> Self {
        Self {
            id: row.id,
            quiz_id: row.quiz_id,
            text: row.text,
            score: row.score,
            question_type: row.question_type,
            answer: None,
            choices: Vec::new(),
            correct_option_id: None,
        }
    }

    pub fn has_choice(&self, choice_id: i64) -> bool {
        self.choices.iter().any(|c| c.id == choice_id)
    }
}

/// DTO for sending a question to participants (no reference answer, no correct option).
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub text: String,
    pub score: f64,
    pub question_type: QuestionType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            text: q.text,
            score: q.score,
            question_type: q.question_type,
            choices: q.choices,
        }
    }
}

/// Question totals of a quiz, split by family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct QuestionCounts {
    pub descriptive: i64,
    pub multiple_options: i64,
}

impl QuestionCounts {
    pub fn total(&self) -> i64 {
        self.descriptive + self.multiple_options
    }

    pub fn of(&self, family: QuestionFamily) -> i64 {
        match family {
            QuestionFamily::Descriptive => self.descriptive,
            QuestionFamily::MultipleOptions => self.multiple_options,
        }
    }
}

/// DTO for creating a descriptive question (short or long answer).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDescriptiveRequest {
    #[validate(length(min = 1, max = 355))]
    pub question: String,
    pub answer: Option<String>,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceInput {
    pub text: String,
}

/// DTO for creating a multiple-options question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMultipleOptionsRequest {
    #[validate(length(min = 1, max = 355))]
    pub question: String,
    #[validate(length(min = 2, message = "A multiple-options question needs at least two choices."))]
    pub options: Vec<ChoiceInput>,
    #[serde(default = "default_score")]
    pub score: f64,
    pub correct_option_index: usize,
}

fn default_score() -> f64 {
    1.0
}

/// DTO for editing a descriptive question.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDescriptiveRequest {
    #[validate(length(min = 1, max = 355))]
    pub text: String,
    pub new_score: f64,
    pub answer: Option<String>,
}

/// One entry of a choice reconciliation patch. No id means "insert".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoicePatch {
    pub id: Option<i64>,
    pub text: String,
}

/// DTO for editing a multiple-options question.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMultipleOptionsRequest {
    #[validate(length(min = 1, max = 355))]
    pub text: String,
    #[validate(length(min = 2, message = "A multiple-options question needs at least two choices."))]
    pub options: Vec<ChoicePatch>,
    pub new_score: f64,
    pub correct_option_index: usize,
}

#[derive(Debug, Deserialize)]
pub struct SetCorrectOptionRequest {
    pub choice_id: i64,
}

/// Store input for a new descriptive question.
#[derive(Debug, Clone)]
pub struct NewDescriptiveQuestion {
    pub quiz_id: i64,
    pub text: String,
    pub score: f64,
    pub question_type: QuestionType,
    pub answer: Option<String>,
}

/// Store input for a new multiple-options question.
/// `correct_index` points into `choices` and is resolved to the created choice id.
#[derive(Debug, Clone)]
pub struct NewMultipleOptionsQuestion {
    pub quiz_id: i64,
    pub text: String,
    pub score: f64,
    pub choices: Vec<String>,
    pub correct_index: usize,
}

/// Store input for a descriptive question edit.
#[derive(Debug, Clone)]
pub struct DescriptiveEdit {
    pub text: String,
    pub score: f64,
    pub answer: Option<String>,
}

/// Result of reconciling a choice patch against the stored choices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChoicePlan {
    /// Existing choices whose text is overwritten, in id order.
    pub updates: Vec<(i64, String)>,
    /// New choices, in patch order. They sort after every surviving choice.
    pub inserts: Vec<String>,
    /// Existing choices not referenced by the patch.
    pub deletes: Vec<i64>,
}

impl ChoicePlan {
    /// Number of choices the question owns once the plan is applied.
    pub fn final_len(&self) -> usize {
        self.updates.len() + self.inserts.len()
    }
}

/// Store input for a multiple-options question edit.
#[derive(Debug, Clone)]
pub struct MultipleOptionsEdit {
    pub text: String,
    pub score: f64,
    pub plan: ChoicePlan,
    /// Resolved against the post-update ordered choice list.
    pub correct_index: usize,
}

/// One entry of the owner's answer key.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerKeyEntry {
    pub question_type: QuestionType,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_option_id: Option<i64>,
}

impl From<&Question> for AnswerKeyEntry {
    fn from(q: &Question) -> Self {
        Self {
            question_type: q.question_type,
            score: q.score,
            answer: q.answer.as_ref().and_then(|a| a.answer.clone()),
            correct_option_id: q.correct_option_id,
        }
    }
}
