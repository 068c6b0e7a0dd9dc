// src/models/quiz.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::question::PublicQuestion;

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub title: String,
    pub owner_id: i64,

    /// Scheduling window. Only meaningful as a pair.
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,

    /// Draft (false) or Active (true).
    pub is_active: bool,

    /// Plaintext join code, compared verbatim.
    pub password: Option<String>,
    pub need_password: bool,
    pub shuffle_options: bool,

    /// Unique human-readable slug used by participants.
    pub quiz_path: String,
}

/// A quiz row joined with the number of questions it owns.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizSummary {
    pub id: i64,
    pub title: String,
    pub is_active: bool,
    pub quiz_path: String,
    pub question_count: i64,
}

/// DTO for creating a new quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(min = 3, max = 200, message = "Title length must be between 3 and 200 characters."))]
    pub title: String,
}

/// Sparse settings patch. Every field is optional.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct QuizSettingsPatch {
    pub title: Option<String>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub quiz_path: Option<String>,
    pub shuffle_options: Option<bool>,
}

/// The validated subset of a settings patch that is written to the store.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SettingsChanges {
    pub title: Option<String>,
    /// Both bounds, or nothing.
    pub window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub quiz_path: Option<String>,
    pub shuffle_options: Option<bool>,
}

impl SettingsChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.window.is_none()
            && self.quiz_path.is_none()
            && self.shuffle_options.is_none()
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetPasswordRequest {
    #[validate(length(min = 1, max = 100))]
    pub password: String,
    /// Whether participants must enter the password.
    pub quiz_lock: bool,
}

#[derive(Debug, Serialize)]
pub struct ActivationStatus {
    pub message: String,
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct PasswordStatus {
    pub quiz_id: i64,
    pub need_password: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct EnterPasswordRequest {
    pub password: Option<String>,
}

/// What a participant sees after passing the password and schedule gates.
#[derive(Debug, Serialize)]
pub struct PublishedQuiz {
    pub quiz_id: i64,
    pub quiz_title: String,
    pub end_at: Option<DateTime<Utc>>,
    pub questions: Vec<PublicQuestion>,
}
