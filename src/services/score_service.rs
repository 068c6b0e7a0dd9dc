// src/services/score_service.rs

use std::{collections::BTreeMap, sync::Arc};

use crate::{
    error::{AppError, AppResult},
    models::{
        participant::{ParticipantDetail, ParticipantScore, QuizResults},
        question::AnswerKeyEntry,
        user::UserInfo,
    },
    repositories::{ParticipantRepository, QuestionRepository, QuizRepository},
    services::access::authorize_quiz,
};

/// Score aggregation and the owner's review views.
pub struct ScoreService {
    quizzes: Arc<dyn QuizRepository>,
    questions: Arc<dyn QuestionRepository>,
    participants: Arc<dyn ParticipantRepository>,
}

impl ScoreService {
    pub fn new(
        quizzes: Arc<dyn QuizRepository>,
        questions: Arc<dyn QuestionRepository>,
        participants: Arc<dyn ParticipantRepository>,
    ) -> Self {
        Self {
            quizzes,
            questions,
            participants,
        }
    }

    /// One row per participant; missing contributions count as zero.
    pub async fn participant_scores(&self, quiz_id: i64) -> AppResult<Vec<ParticipantScore>> {
        self.participants.scores(quiz_id).await
    }

    pub async fn total_possible_score(&self, quiz_id: i64) -> AppResult<f64> {
        self.questions.total_score(quiz_id).await
    }

    pub async fn results(&self, user: UserInfo, quiz_id: i64) -> AppResult<QuizResults> {
        authorize_quiz(self.quizzes.as_ref(), user, quiz_id).await?;

        Ok(QuizResults {
            total_quiz_score: self.total_possible_score(quiz_id).await?,
            participant_answers: self.participant_scores(quiz_id).await?,
        })
    }

    pub async fn participant_detail(
        &self,
        user: UserInfo,
        quiz_id: i64,
        participant_id: i64,
    ) -> AppResult<ParticipantDetail> {
        authorize_quiz(self.quizzes.as_ref(), user, quiz_id).await?;

        self.participants
            .detail(quiz_id, participant_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Participant not found".to_string()))
    }

    /// Every question of the quiz keyed by id, with its expected answer.
    pub async fn answer_key(&self, user: UserInfo, quiz_id: i64) -> AppResult<BTreeMap<i64, AnswerKeyEntry>> {
        authorize_quiz(self.quizzes.as_ref(), user, quiz_id).await?;

        Ok(self
            .questions
            .list_by_quiz(quiz_id)
            .await?
            .iter()
            .map(|q| (q.id, AnswerKeyEntry::from(q)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            participant::{DescriptiveAnswerInput, MultipleOptionAnswerInput, NewParticipant},
            question::{NewDescriptiveQuestion, NewMultipleOptionsQuestion, QuestionType},
        },
        repositories::MemoryStore,
    };

    const OWNER: UserInfo = UserInfo { user_id: 1, is_admin: false };

    #[tokio::test]
    async fn test_options_score_sums_correct_answers_only() {
        let store = Arc::new(MemoryStore::new());
        let quiz = QuizRepository::create(store.as_ref(), OWNER.user_id, "Traits", "traits-quiz")
            .await
            .unwrap();
        let essay = store
            .create_descriptive(&NewDescriptiveQuestion {
                quiz_id: quiz.id,
                text: "Explain dyn".to_string(),
                score: 5.0,
                question_type: QuestionType::DescriptiveLong,
                answer: Some("dynamic dispatch".to_string()),
            })
            .await
            .unwrap();
        let mut option_questions = Vec::new();
        for score in [2.0, 3.0] {
            option_questions.push(
                store
                    .create_multiple_options(&NewMultipleOptionsQuestion {
                        quiz_id: quiz.id,
                        text: "Object safe?".to_string(),
                        score,
                        choices: vec!["yes".into(), "no".into()],
                        correct_index: 0,
                    })
                    .await
                    .unwrap(),
            );
        }

        let participant = store
            .create_with_answers(&NewParticipant {
                quiz_id: quiz.id,
                username: "dave+abcdefgh".to_string(),
                descriptive: vec![DescriptiveAnswerInput {
                    question_id: essay.id,
                    answer: "vtables".to_string(),
                }],
                multiple_options: option_questions
                    .iter()
                    .map(|q| MultipleOptionAnswerInput {
                        question_id: q.id,
                        option_id: q.choices[0].id,
                    })
                    .collect(),
            })
            .await
            .unwrap();
        let detail = store.detail(quiz.id, participant.id).await.unwrap().unwrap();
        let answer_ids: Vec<i64> = detail.multiple_options.iter().map(|a| a.id).collect();
        store.toggle_correctness(participant.id, &answer_ids).await.unwrap();

        let service = ScoreService::new(store.clone(), store.clone(), store.clone());
        let results = service.results(OWNER, quiz.id).await.unwrap();
        assert_eq!(results.total_quiz_score, 10.0);
        assert_eq!(results.participant_answers.len(), 1);
        assert_eq!(results.participant_answers[0].options_score, 5.0);
        assert_eq!(results.participant_answers[0].descriptive_score, 0.0);

        let key = service.answer_key(OWNER, quiz.id).await.unwrap();
        assert_eq!(key[&essay.id].answer.as_deref(), Some("dynamic dispatch"));
        assert_eq!(
            key[&option_questions[1].id].correct_option_id,
            Some(option_questions[1].choices[0].id)
        );
    }

    #[tokio::test]
    async fn test_total_score_ignores_participants() {
        let store = Arc::new(MemoryStore::new());
        let quiz = QuizRepository::create(store.as_ref(), OWNER.user_id, "Empty", "empty-quiz")
            .await
            .unwrap();
        let service = ScoreService::new(store.clone(), store.clone(), store.clone());
        assert_eq!(service.total_possible_score(quiz.id).await.unwrap(), 0.0);
        assert!(matches!(
            service.participant_detail(OWNER, quiz.id, 77).await,
            Err(AppError::NotFound(_))
        ));
    }
}
