// src/services/submission_service.rs

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        participant::{MultipleOptionAnswerInput, NewParticipant, SubmissionReceipt, SubmitAnswersRequest},
        question::{Question, QuestionFamily},
    },
    repositories::{ParticipantRepository, QuestionRepository, QuizRepository},
    services::lifecycle,
    utils::random::participant_username,
};

/// Every question of a family must be answered exactly once.
///
/// `fetched` counts the distinct questions of the family the submitted ids
/// resolved to; `expected` is how many the quiz owns.
pub fn check_answer_count(submitted: usize, fetched: usize, expected: i64) -> AppResult<()> {
    if submitted != fetched || fetched as i64 != expected {
        return Err(AppError::QuestionMissing);
    }
    Ok(())
}

/// Each chosen option must belong to the question it answers.
pub fn check_chosen_options(questions: &[Question], answers: &[MultipleOptionAnswerInput]) -> AppResult<()> {
    let by_id: HashMap<i64, &Question> = questions.iter().map(|q| (q.id, q)).collect();
    for answer in answers {
        let question = by_id
            .get(&answer.question_id)
            .ok_or(AppError::QuestionMissing)?;
        if !question.has_choice(answer.option_id) {
            return Err(AppError::WrongOption(answer.option_id));
        }
    }
    Ok(())
}

/// Answer intake for published quizzes.
pub struct SubmissionService {
    quizzes: Arc<dyn QuizRepository>,
    questions: Arc<dyn QuestionRepository>,
    participants: Arc<dyn ParticipantRepository>,
}

impl SubmissionService {
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

    /// Validates a full submission and stores it as one new participant.
    pub async fn submit(
        &self,
        quiz_id: i64,
        request: SubmitAnswersRequest,
        now: DateTime<Utc>,
    ) -> AppResult<SubmissionReceipt> {
        request.validate()?;

        let quiz = self
            .quizzes
            .find_by_id(quiz_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;
        lifecycle::check_schedule(&quiz, now)?;

        let counts = self.questions.count_by_quiz(quiz_id).await?;

        let descriptive_ids: Vec<i64> = request.descriptive.iter().map(|a| a.question_id).collect();
        let descriptive = self
            .questions
            .find_by_ids(quiz_id, &descriptive_ids, QuestionFamily::Descriptive)
            .await?;
        check_answer_count(
            descriptive_ids.len(),
            descriptive.len(),
            counts.of(QuestionFamily::Descriptive),
        )?;

        let option_ids: Vec<i64> = request
            .multiple_options
            .iter()
            .map(|a| a.question_id)
            .collect();
        let multiple_options = self
            .questions
            .find_by_ids(quiz_id, &option_ids, QuestionFamily::MultipleOptions)
            .await?;
        check_answer_count(
            option_ids.len(),
            multiple_options.len(),
            counts.of(QuestionFamily::MultipleOptions),
        )?;

        check_chosen_options(&multiple_options, &request.multiple_options).inspect_err(|e| {
            tracing::warn!(quiz_id, "Rejected submission: {}", e);
        })?;

        let username = participant_username(&request.participant_info.username);
        let participant = self
            .participants
            .create_with_answers(&NewParticipant {
                quiz_id,
                username,
                descriptive: request.descriptive,
                multiple_options: request.multiple_options,
            })
            .await?;

        tracing::info!(quiz_id, participant_id = participant.id, "Answers submitted");

        Ok(SubmissionReceipt {
            message: "answers submitted".to_string(),
            participant_id: participant.id,
            username: participant.username,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            participant::{DescriptiveAnswerInput, ParticipantInfo},
            question::{Choice, NewDescriptiveQuestion, NewMultipleOptionsQuestion, QuestionType},
        },
        repositories::MemoryStore,
    };

    fn option_question(id: i64, choice_ids: &[i64]) -> Question {
        Question {
            id,
            quiz_id: 1,
            text: "Pick".to_string(),
            score: 1.0,
            question_type: QuestionType::MultipleOptions,
            answer: None,
            choices: choice_ids
                .iter()
                .map(|&cid| Choice {
                    id: cid,
                    question_id: id,
                    text: format!("choice {cid}"),
                })
                .collect(),
            correct_option_id: None,
        }
    }

    #[test]
    fn test_answer_count_must_match_both_sides() {
        assert!(check_answer_count(2, 2, 2).is_ok());
        assert!(check_answer_count(0, 0, 0).is_ok());
        // fewer answers than questions
        assert!(matches!(check_answer_count(1, 1, 2), Err(AppError::QuestionMissing)));
        // duplicate or unknown ids
        assert!(check_answer_count(2, 1, 2).is_err());
        assert!(check_answer_count(3, 2, 2).is_err());
    }

    #[test]
    fn test_wrong_option_names_the_choice() {
        let questions = [option_question(10, &[100, 101]), option_question(11, &[110, 111])];
        let answers = [
            MultipleOptionAnswerInput { question_id: 10, option_id: 101 },
            MultipleOptionAnswerInput { question_id: 11, option_id: 100 },
        ];
        assert!(matches!(
            check_chosen_options(&questions, &answers),
            Err(AppError::WrongOption(100))
        ));
        assert!(check_chosen_options(&questions, &answers[..1]).is_ok());
    }

    struct Fixture {
        service: SubmissionService,
        store: Arc<MemoryStore>,
        quiz_id: i64,
        descriptive_id: i64,
        option_question: Question,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let quiz = QuizRepository::create(store.as_ref(), 1, "Macros", "macros-quiz")
            .await
            .unwrap();
        let descriptive = store
            .create_descriptive(&NewDescriptiveQuestion {
                quiz_id: quiz.id,
                text: "What does macro_rules! do?".to_string(),
                score: 3.0,
                question_type: QuestionType::DescriptiveShort,
                answer: None,
            })
            .await
            .unwrap();
        let option_question = store
            .create_multiple_options(&NewMultipleOptionsQuestion {
                quiz_id: quiz.id,
                text: "Hygienic?".to_string(),
                score: 2.0,
                choices: vec!["yes".into(), "no".into()],
                correct_index: 0,
            })
            .await
            .unwrap();

        Fixture {
            service: SubmissionService::new(store.clone(), store.clone(), store.clone()),
            store,
            quiz_id: quiz.id,
            descriptive_id: descriptive.id,
            option_question,
        }
    }

    fn request(descriptive: Vec<DescriptiveAnswerInput>, options: Vec<MultipleOptionAnswerInput>) -> SubmitAnswersRequest {
        SubmitAnswersRequest {
            participant_info: ParticipantInfo {
                username: "alice".to_string(),
            },
            descriptive,
            multiple_options: options,
        }
    }

    #[tokio::test]
    async fn test_complete_submission_creates_one_participant() {
        let f = fixture().await;
        let receipt = f
            .service
            .submit(
                f.quiz_id,
                request(
                    vec![DescriptiveAnswerInput {
                        question_id: f.descriptive_id,
                        answer: "expands code".to_string(),
                    }],
                    vec![MultipleOptionAnswerInput {
                        question_id: f.option_question.id,
                        option_id: f.option_question.choices[0].id,
                    }],
                ),
                Utc::now(),
            )
            .await
            .unwrap();
        assert!(receipt.username.starts_with("alice+"));

        let detail = f
            .store
            .detail(f.quiz_id, receipt.participant_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(detail.descriptive.len(), 1);
        assert_eq!(detail.multiple_options.len(), 1);
        assert_eq!(detail.multiple_options[0].is_correct, None);
    }

    #[tokio::test]
    async fn test_missing_or_mistyped_answers_are_rejected() {
        let f = fixture().await;
        let missing = request(vec![], vec![MultipleOptionAnswerInput {
            question_id: f.option_question.id,
            option_id: f.option_question.choices[0].id,
        }]);
        assert!(matches!(
            f.service.submit(f.quiz_id, missing, Utc::now()).await,
            Err(AppError::QuestionMissing)
        ));

        // A descriptive answer naming the multiple-options question is invisible to the fetch.
        let mistyped = request(
            vec![DescriptiveAnswerInput {
                question_id: f.option_question.id,
                answer: "oops".to_string(),
            }],
            vec![MultipleOptionAnswerInput {
                question_id: f.option_question.id,
                option_id: f.option_question.choices[0].id,
            }],
        );
        assert!(matches!(
            f.service.submit(f.quiz_id, mistyped, Utc::now()).await,
            Err(AppError::QuestionMissing)
        ));
        assert!(f.store.scores(f.quiz_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_option_creates_no_participant() {
        let f = fixture().await;
        let bad = request(
            vec![DescriptiveAnswerInput {
                question_id: f.descriptive_id,
                answer: "anything".to_string(),
            }],
            vec![MultipleOptionAnswerInput {
                question_id: f.option_question.id,
                option_id: 999_999,
            }],
        );
        assert!(matches!(
            f.service.submit(f.quiz_id, bad, Utc::now()).await,
            Err(AppError::WrongOption(999_999))
        ));
        assert!(f.store.scores(f.quiz_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_plus_in_display_name_is_rejected() {
        let f = fixture().await;
        let mut bad = request(vec![], vec![]);
        bad.participant_info.username = "a+b".to_string();
        assert!(matches!(
            f.service.submit(f.quiz_id, bad, Utc::now()).await,
            Err(AppError::Validation(_))
        ));
    }
}
