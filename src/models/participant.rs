// src/models/participant.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::question::QuestionType;

/// Represents the 'participants' table. An anonymous respondent, not a registered user.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Participant {
    pub id: i64,
    pub quiz_id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Represents the 'participant_descriptive_answers' table, tagged with its question's type.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct DescriptiveAnswer {
    pub id: i64,
    pub question_id: i64,
    pub answer: String,
    pub score: f64,
    pub question_type: QuestionType,
}

/// Represents the 'participant_multiple_option_answers' table, tagged with its question's type.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct MultipleOptionAnswer {
    pub id: i64,
    pub question_id: i64,
    #[serde(rename = "option_id")]
    pub choice_id: i64,
    /// Unset until an owner marks it.
    pub is_correct: Option<bool>,
    pub question_type: QuestionType,
}

/// A participant with every answer attached.
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantDetail {
    #[serde(rename = "participant_id")]
    pub id: i64,
    pub username: String,
    pub descriptive: Vec<DescriptiveAnswer>,
    pub multiple_options: Vec<MultipleOptionAnswer>,
}

/// Aggregated score row of one participant.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ParticipantScore {
    pub username: String,
    pub participant_id: i64,
    pub descriptive_score: f64,
    pub options_score: f64,
}

#[derive(Debug, Serialize)]
pub struct QuizResults {
    pub total_quiz_score: f64,
    pub participant_answers: Vec<ParticipantScore>,
}

/// A descriptive answer of a participant joined with its question's score cap.
#[derive(Debug, Clone, FromRow)]
pub struct GradableAnswer {
    pub id: i64,
    pub question_score: f64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ParticipantInfo {
    #[validate(length(min = 1, max = 355), custom(function = validate_display_name))]
    pub username: String,
}

fn validate_display_name(name: &str) -> Result<(), validator::ValidationError> {
    if name.contains('+') {
        return Err(validator::ValidationError::new("bad_username_character")
            .with_message("username must not include \"+\" character".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DescriptiveAnswerInput {
    pub question_id: i64,
    #[validate(length(max = 600))]
    pub answer: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MultipleOptionAnswerInput {
    pub question_id: i64,
    pub option_id: i64,
}

/// DTO for a participant's full answer submission.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitAnswersRequest {
    #[validate(nested)]
    pub participant_info: ParticipantInfo,
    #[serde(default)]
    #[validate(nested)]
    pub descriptive: Vec<DescriptiveAnswerInput>,
    #[serde(default)]
    pub multiple_options: Vec<MultipleOptionAnswerInput>,
}

/// Store input for a participant and all its answers.
#[derive(Debug, Clone)]
pub struct NewParticipant {
    pub quiz_id: i64,
    pub username: String,
    pub descriptive: Vec<DescriptiveAnswerInput>,
    pub multiple_options: Vec<MultipleOptionAnswerInput>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScoreInput {
    pub score: f64,
}

/// DTO for grading one participant.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GradeAnswersRequest {
    /// Descriptive answer id → new score.
    #[serde(default)]
    pub descriptive: HashMap<i64, ScoreInput>,
    /// Multiple-option answer ids whose correctness flag is flipped.
    #[serde(default)]
    pub multiple_options: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct SubmissionReceipt {
    pub message: String,
    pub participant_id: i64,
    pub username: String,
}
