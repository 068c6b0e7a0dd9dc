// src/repositories/mod.rs
//
// Narrow persistence interfaces consumed by the services. Every method that
// touches more than one row is atomic: it either commits completely or leaves
// the store untouched.

pub mod memory;
pub mod participant_repository;
pub mod question_repository;
pub mod quiz_repository;
pub mod user_repository;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{
        participant::{
            GradableAnswer, NewParticipant, Participant, ParticipantDetail, ParticipantScore,
        },
        question::{
            DescriptiveEdit, MultipleOptionsEdit, NewDescriptiveQuestion,
            NewMultipleOptionsQuestion, Question, QuestionCounts, QuestionFamily,
        },
        quiz::{Quiz, QuizSummary, SettingsChanges},
        user::User,
    },
};

pub use memory::MemoryStore;
pub use participant_repository::PgParticipantRepository;
pub use question_repository::PgQuestionRepository;
pub use quiz_repository::PgQuizRepository;
pub use user_repository::PgUserRepository;

#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn create(&self, owner_id: i64, title: &str, quiz_path: &str) -> AppResult<Quiz>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Quiz>>;
    async fn find_by_path(&self, quiz_path: &str) -> AppResult<Option<Quiz>>;
    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<QuizSummary>>;
    /// Whether a quiz other than `except_id` already uses the path.
    async fn path_taken(&self, quiz_path: &str, except_id: Option<i64>) -> AppResult<bool>;
    async fn update_settings(&self, id: i64, changes: &SettingsChanges) -> AppResult<Quiz>;
    async fn set_active(&self, id: i64, is_active: bool) -> AppResult<Quiz>;
    async fn set_password(&self, id: i64, password: &str, need_password: bool) -> AppResult<Quiz>;
    /// Cascades to questions and participants. Returns false when nothing was deleted.
    async fn delete(&self, id: i64) -> AppResult<bool>;
}

#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn create_descriptive(&self, new: &NewDescriptiveQuestion) -> AppResult<Question>;
    /// Question, choices and correct option in one transaction.
    async fn create_multiple_options(&self, new: &NewMultipleOptionsQuestion) -> AppResult<Question>;
    async fn find_in_quiz(&self, quiz_id: i64, question_id: i64) -> AppResult<Option<Question>>;
    async fn list_by_quiz(&self, quiz_id: i64) -> AppResult<Vec<Question>>;
    async fn count_by_quiz(&self, quiz_id: i64) -> AppResult<QuestionCounts>;
    /// Only questions of `quiz_id` whose type belongs to `family`.
    async fn find_by_ids(
        &self,
        quiz_id: i64,
        ids: &[i64],
        family: QuestionFamily,
    ) -> AppResult<Vec<Question>>;
    /// Creates or repoints the single correct-option row of a question.
    async fn set_correct_option(&self, question_id: i64, choice_id: i64) -> AppResult<()>;
    async fn update_descriptive(&self, question_id: i64, edit: &DescriptiveEdit) -> AppResult<Question>;
    /// Applies the reconciliation plan, then resolves `correct_index` against the final choices.
    async fn update_multiple_options(
        &self,
        question_id: i64,
        edit: &MultipleOptionsEdit,
    ) -> AppResult<Question>;
    async fn delete(&self, quiz_id: i64, question_id: i64) -> AppResult<bool>;
    async fn total_score(&self, quiz_id: i64) -> AppResult<f64>;
}

#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    /// Participant row plus every answer row in one transaction.
    async fn create_with_answers(&self, new: &NewParticipant) -> AppResult<Participant>;
    async fn find_in_quiz(&self, quiz_id: i64, participant_id: i64) -> AppResult<Option<Participant>>;
    async fn detail(&self, quiz_id: i64, participant_id: i64) -> AppResult<Option<ParticipantDetail>>;
    async fn scores(&self, quiz_id: i64) -> AppResult<Vec<ParticipantScore>>;
    /// The participant's descriptive answers among `ids`, with their question's score cap.
    async fn gradable_answers(&self, participant_id: i64, ids: &[i64]) -> AppResult<Vec<GradableAnswer>>;
    async fn set_descriptive_scores(&self, participant_id: i64, scores: &[(i64, f64)]) -> AppResult<()>;
    /// true → false, anything else → true. Returns the number of rows flipped.
    async fn toggle_correctness(&self, participant_id: i64, answer_ids: &[i64]) -> AppResult<u64>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn email_exists(&self, email: &str) -> AppResult<bool>;
    async fn create(
        &self,
        email: &str,
        full_name: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> AppResult<User>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;
}

/// The full set of stores a running service needs.
#[derive(Clone)]
pub struct Repositories {
    pub quizzes: Arc<dyn QuizRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub participants: Arc<dyn ParticipantRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            quizzes: Arc::new(PgQuizRepository::new(pool.clone())),
            questions: Arc::new(PgQuestionRepository::new(pool.clone())),
            participants: Arc::new(PgParticipantRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            quizzes: store.clone(),
            questions: store.clone(),
            participants: store.clone(),
            users: store,
        }
    }
}
