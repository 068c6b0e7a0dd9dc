// src/services/quiz_service.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        question::PublicQuestion,
        quiz::{
            ActivationStatus, CreateQuizRequest, PasswordStatus, PublishedQuiz, Quiz,
            QuizSettingsPatch, QuizSummary, SetPasswordRequest,
        },
        user::UserInfo,
    },
    repositories::{QuestionRepository, QuizRepository},
    services::{access::authorize_quiz, lifecycle},
    utils::random::random_quiz_path,
};

const PATH_ATTEMPTS: usize = 5;

/// Quiz state machine and the participant-facing read surface.
pub struct QuizService {
    quizzes: Arc<dyn QuizRepository>,
    questions: Arc<dyn QuestionRepository>,
}

impl QuizService {
    pub fn new(quizzes: Arc<dyn QuizRepository>, questions: Arc<dyn QuestionRepository>) -> Self {
        Self { quizzes, questions }
    }

    pub async fn create(&self, user: UserInfo, request: CreateQuizRequest) -> AppResult<Quiz> {
        request.validate()?;

        for _ in 0..PATH_ATTEMPTS {
            let path = random_quiz_path();
            if self.quizzes.path_taken(&path, None).await? {
                continue;
            }
            match self.quizzes.create(user.user_id, &request.title, &path).await {
                Ok(quiz) => {
                    tracing::info!(quiz_id = quiz.id, owner_id = user.user_id, "Quiz created");
                    return Ok(quiz);
                }
                // Lost a race for the same path; roll a new one.
                Err(AppError::Conflict(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(AppError::Conflict(
            "could not allocate a unique quiz path".to_string(),
        ))
    }

    pub async fn list(&self, user: UserInfo) -> AppResult<Vec<QuizSummary>> {
        self.quizzes.list_by_owner(user.user_id).await
    }

    pub async fn get(&self, user: UserInfo, quiz_id: i64) -> AppResult<Quiz> {
        authorize_quiz(self.quizzes.as_ref(), user, quiz_id).await
    }

    pub async fn delete(&self, user: UserInfo, quiz_id: i64) -> AppResult<()> {
        authorize_quiz(self.quizzes.as_ref(), user, quiz_id).await?;

        if !self.quizzes.delete(quiz_id).await? {
            return Err(AppError::NotFound("Quiz not found".to_string()));
        }

        tracing::info!(quiz_id, "Quiz deleted");
        Ok(())
    }

    pub async fn set_password(
        &self,
        user: UserInfo,
        quiz_id: i64,
        request: SetPasswordRequest,
    ) -> AppResult<Quiz> {
        request.validate()?;
        authorize_quiz(self.quizzes.as_ref(), user, quiz_id).await?;

        self.quizzes
            .set_password(quiz_id, &request.password, request.quiz_lock)
            .await
    }

    pub async fn update_settings(
        &self,
        user: UserInfo,
        quiz_id: i64,
        patch: QuizSettingsPatch,
        now: DateTime<Utc>,
    ) -> AppResult<Quiz> {
        let quiz = authorize_quiz(self.quizzes.as_ref(), user, quiz_id).await?;
        let changes = lifecycle::normalize_settings(patch, now)?;

        // An active quiz keeps a non-empty window.
        if let Some((start_at, end_at)) = changes.window {
            if quiz.is_active && start_at >= end_at {
                return Err(AppError::Validation(
                    "start_at must be earlier than end_at while the quiz is active".to_string(),
                ));
            }
        }

        if let Some(path) = &changes.quiz_path {
            if self.quizzes.path_taken(path, Some(quiz_id)).await? {
                return Err(AppError::Conflict(format!("quiz path '{path}' already exists")));
            }
        }

        if changes.is_empty() {
            return Ok(quiz);
        }

        self.quizzes.update_settings(quiz_id, &changes).await
    }

    pub async fn activate(&self, user: UserInfo, quiz_id: i64) -> AppResult<Quiz> {
        let quiz = authorize_quiz(self.quizzes.as_ref(), user, quiz_id).await?;
        self.activate_quiz(&quiz).await
    }

    pub async fn deactivate(&self, user: UserInfo, quiz_id: i64) -> AppResult<Quiz> {
        authorize_quiz(self.quizzes.as_ref(), user, quiz_id).await?;
        self.deactivate_quiz(quiz_id).await
    }

    /// Active → Draft, Draft → Active (with the activation rules).
    pub async fn toggle_activation(&self, user: UserInfo, quiz_id: i64) -> AppResult<ActivationStatus> {
        let quiz = authorize_quiz(self.quizzes.as_ref(), user, quiz_id).await?;

        let updated = if quiz.is_active {
            self.deactivate_quiz(quiz_id).await?
        } else {
            self.activate_quiz(&quiz).await?
        };

        let message = if updated.is_active {
            "quiz activated"
        } else {
            "quiz deactivated"
        };
        Ok(ActivationStatus {
            message: message.to_string(),
            is_active: updated.is_active,
        })
    }

    async fn activate_quiz(&self, quiz: &Quiz) -> AppResult<Quiz> {
        let counts = self.questions.count_by_quiz(quiz.id).await?;
        lifecycle::validate_activation(quiz, counts.total())?;

        let quiz = self.quizzes.set_active(quiz.id, true).await?;
        tracing::info!(quiz_id = quiz.id, "Quiz activated");
        Ok(quiz)
    }

    async fn deactivate_quiz(&self, quiz_id: i64) -> AppResult<Quiz> {
        let quiz = self.quizzes.set_active(quiz_id, false).await?;
        tracing::info!(quiz_id, "Quiz deactivated");
        Ok(quiz)
    }

    pub async fn password_status(&self, quiz_path: &str, now: DateTime<Utc>) -> AppResult<PasswordStatus> {
        let quiz = self
            .quizzes
            .find_by_path(quiz_path)
            .await?
            .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

        lifecycle::check_published_accessible(&quiz, now)?;

        Ok(PasswordStatus {
            quiz_id: quiz.id,
            need_password: quiz.need_password,
        })
    }

    /// Participant view: password and schedule gates, then the questions without answers.
    pub async fn published_questions(
        &self,
        quiz_id: i64,
        entered_password: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<PublishedQuiz> {
        let quiz = self
            .quizzes
            .find_by_id(quiz_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

        lifecycle::check_password(&quiz, entered_password)?;
        lifecycle::check_published_accessible(&quiz, now)?;

        let mut questions: Vec<PublicQuestion> = self
            .questions
            .list_by_quiz(quiz.id)
            .await?
            .into_iter()
            .map(PublicQuestion::from)
            .collect();

        if quiz.shuffle_options {
            questions.shuffle(&mut rand::thread_rng());
        }

        Ok(PublishedQuiz {
            quiz_id: quiz.id,
            quiz_title: quiz.title,
            end_at: quiz.end_at,
            questions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::question::NewDescriptiveQuestion, models::question::QuestionType,
        repositories::MemoryStore,
    };
    use chrono::Duration;

    const OWNER: UserInfo = UserInfo { user_id: 1, is_admin: false };
    const STRANGER: UserInfo = UserInfo { user_id: 2, is_admin: false };

    fn service() -> (QuizService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (QuizService::new(store.clone(), store.clone()), store)
    }

    async fn add_question(store: &MemoryStore, quiz_id: i64) {
        store
            .create_descriptive(&NewDescriptiveQuestion {
                quiz_id,
                text: "Explain borrowing".to_string(),
                score: 3.0,
                question_type: QuestionType::DescriptiveShort,
                answer: None,
            })
            .await
            .unwrap();
    }

    fn schedule(now: DateTime<Utc>) -> QuizSettingsPatch {
        QuizSettingsPatch {
            start_at: Some(now + Duration::minutes(1)),
            end_at: Some(now + Duration::hours(1)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_assigns_random_path() {
        let (service, _) = service();
        let quiz = service
            .create(OWNER, CreateQuizRequest { title: "Lifetimes".to_string() })
            .await
            .unwrap();
        assert_eq!(quiz.quiz_path.len(), 8);
        assert!(!quiz.is_active);
    }

    #[tokio::test]
    async fn test_stranger_cannot_read_settings() {
        let (service, _) = service();
        let quiz = service
            .create(OWNER, CreateQuizRequest { title: "Lifetimes".to_string() })
            .await
            .unwrap();
        assert!(matches!(
            service.get(STRANGER, quiz.id).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_activation_cycle() {
        let (service, store) = service();
        let now = Utc::now();
        let quiz = service
            .create(OWNER, CreateQuizRequest { title: "Generics".to_string() })
            .await
            .unwrap();

        service
            .update_settings(OWNER, quiz.id, schedule(now), now)
            .await
            .unwrap();
        assert!(service.activate(OWNER, quiz.id).await.is_err());

        add_question(&store, quiz.id).await;
        for _ in 0..2 {
            assert!(service.activate(OWNER, quiz.id).await.unwrap().is_active);
            assert!(!service.deactivate(OWNER, quiz.id).await.unwrap().is_active);
        }

        let status = service.toggle_activation(OWNER, quiz.id).await.unwrap();
        assert!(status.is_active);
        let status = service.toggle_activation(OWNER, quiz.id).await.unwrap();
        assert!(!status.is_active);
    }

    #[tokio::test]
    async fn test_half_window_leaves_schedule_untouched() {
        let (service, _) = service();
        let now = Utc::now();
        let quiz = service
            .create(OWNER, CreateQuizRequest { title: "Closures".to_string() })
            .await
            .unwrap();

        let patch = QuizSettingsPatch {
            start_at: Some(now + Duration::hours(1)),
            ..Default::default()
        };
        let updated = service.update_settings(OWNER, quiz.id, patch, now).await.unwrap();
        assert_eq!(updated.start_at, None);
        assert_eq!(updated.end_at, None);
    }

    #[tokio::test]
    async fn test_active_quiz_rejects_empty_window() {
        let (service, store) = service();
        let now = Utc::now();
        let quiz = service
            .create(OWNER, CreateQuizRequest { title: "Traits".to_string() })
            .await
            .unwrap();
        add_question(&store, quiz.id).await;
        service
            .update_settings(OWNER, quiz.id, schedule(now), now)
            .await
            .unwrap();
        service.activate(OWNER, quiz.id).await.unwrap();

        let instant = now + Duration::hours(2);
        let empty_window = || QuizSettingsPatch {
            start_at: Some(instant),
            end_at: Some(instant),
            ..Default::default()
        };
        assert!(matches!(
            service.update_settings(OWNER, quiz.id, empty_window(), now).await,
            Err(AppError::Validation(_))
        ));
        let stored = service.get(OWNER, quiz.id).await.unwrap();
        assert!(stored.is_active);
        assert!(stored.start_at < stored.end_at);

        // Drafts accept equal bounds; activation rejects them later.
        service.deactivate(OWNER, quiz.id).await.unwrap();
        let draft = service
            .update_settings(OWNER, quiz.id, empty_window(), now)
            .await
            .unwrap();
        assert_eq!(draft.start_at, draft.end_at);
        assert!(service.activate(OWNER, quiz.id).await.is_err());
    }

    #[tokio::test]
    async fn test_path_conflict_excludes_own_quiz() {
        let (service, _) = service();
        let now = Utc::now();
        let first = service
            .create(OWNER, CreateQuizRequest { title: "First quiz".to_string() })
            .await
            .unwrap();
        let second = service
            .create(OWNER, CreateQuizRequest { title: "Second quiz".to_string() })
            .await
            .unwrap();

        let rename = |path: &str| QuizSettingsPatch {
            quiz_path: Some(path.to_string()),
            ..Default::default()
        };

        service
            .update_settings(OWNER, first.id, rename("rust-quiz"), now)
            .await
            .unwrap();
        service
            .update_settings(OWNER, first.id, rename("rust-quiz"), now)
            .await
            .unwrap();
        assert!(matches!(
            service
                .update_settings(OWNER, second.id, rename("Rust Quiz"), now)
                .await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_published_questions_gates() {
        let (service, store) = service();
        let now = Utc::now();
        let quiz = service
            .create(OWNER, CreateQuizRequest { title: "Iterators".to_string() })
            .await
            .unwrap();
        add_question(&store, quiz.id).await;
        service
            .update_settings(OWNER, quiz.id, schedule(now), now)
            .await
            .unwrap();
        service
            .set_password(
                OWNER,
                quiz.id,
                SetPasswordRequest {
                    password: "letmein".to_string(),
                    quiz_lock: true,
                },
            )
            .await
            .unwrap();
        service.activate(OWNER, quiz.id).await.unwrap();

        let during = now + Duration::minutes(10);
        assert!(matches!(
            service.published_questions(quiz.id, Some("nope"), during).await,
            Err(AppError::WrongPassword)
        ));
        assert!(matches!(
            service.published_questions(quiz.id, Some("letmein"), now).await,
            Err(AppError::NotStarted)
        ));

        let published = service
            .published_questions(quiz.id, Some("letmein"), during)
            .await
            .unwrap();
        assert_eq!(published.questions.len(), 1);

        let status = service.password_status(&quiz.quiz_path, during).await.unwrap();
        assert!(status.need_password);
    }
}
