// src/services/question_service.rs

use std::{collections::HashMap, sync::Arc};

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        question::{
            Choice, ChoicePatch, ChoicePlan, CreateDescriptiveRequest,
            CreateMultipleOptionsRequest, DescriptiveEdit, MultipleOptionsEdit,
            NewDescriptiveQuestion, NewMultipleOptionsQuestion, Question, QuestionType,
            UpdateDescriptiveRequest, UpdateMultipleOptionsRequest,
        },
        user::UserInfo,
    },
    repositories::{QuestionRepository, QuizRepository},
    services::access::authorize_quiz,
};

const MIN_CHOICES: usize = 2;

/// Reconciles a choice patch against the stored choices of a question.
///
/// Entries without an id become inserts. Entries naming an existing choice
/// overwrite its text. Existing choices no entry names are deleted. Ids that
/// belong to no choice of this question are ignored.
pub fn plan_choices(existing: &[Choice], patch: &[ChoicePatch]) -> ChoicePlan {
    let mut texts: HashMap<i64, &str> = HashMap::new();
    let mut inserts = Vec::new();
    for entry in patch {
        match entry.id {
            Some(id) => {
                texts.insert(id, &entry.text);
            }
            None => inserts.push(entry.text.clone()),
        }
    }

    let mut plan = ChoicePlan {
        inserts,
        ..Default::default()
    };
    for choice in existing {
        match texts.get(&choice.id) {
            Some(text) => plan.updates.push((choice.id, text.to_string())),
            None => plan.deletes.push(choice.id),
        }
    }
    plan
}

fn check_score(score: f64) -> AppResult<()> {
    if score > 0.0 {
        Ok(())
    } else {
        Err(AppError::Validation("score must be greater than zero".to_string()))
    }
}

fn check_reference_answer(question_type: QuestionType, answer: Option<&str>) -> AppResult<()> {
    let limit = question_type.reference_answer_limit();
    match answer {
        Some(answer) if answer.chars().count() > limit => Err(AppError::Validation(format!(
            "answer must be at most {limit} characters"
        ))),
        _ => Ok(()),
    }
}

/// Owner-side question authoring.
pub struct QuestionService {
    quizzes: Arc<dyn QuizRepository>,
    questions: Arc<dyn QuestionRepository>,
}

impl QuestionService {
    pub fn new(quizzes: Arc<dyn QuizRepository>, questions: Arc<dyn QuestionRepository>) -> Self {
        Self { quizzes, questions }
    }

    async fn owned_question(&self, user: UserInfo, quiz_id: i64, question_id: i64) -> AppResult<Question> {
        authorize_quiz(self.quizzes.as_ref(), user, quiz_id).await?;

        self.questions
            .find_in_quiz(quiz_id, question_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Question not found".to_string()))
    }

    pub async fn list(&self, user: UserInfo, quiz_id: i64) -> AppResult<Vec<Question>> {
        authorize_quiz(self.quizzes.as_ref(), user, quiz_id).await?;
        self.questions.list_by_quiz(quiz_id).await
    }

    /// `question_type` must be one of the descriptive kinds.
    pub async fn create_descriptive(
        &self,
        user: UserInfo,
        quiz_id: i64,
        question_type: QuestionType,
        request: CreateDescriptiveRequest,
    ) -> AppResult<Question> {
        if !question_type.is_descriptive() {
            return Err(AppError::Validation(
                "question type is not descriptive".to_string(),
            ));
        }
        request.validate()?;
        check_score(request.score)?;
        check_reference_answer(question_type, request.answer.as_deref())?;
        authorize_quiz(self.quizzes.as_ref(), user, quiz_id).await?;

        let question = self
            .questions
            .create_descriptive(&NewDescriptiveQuestion {
                quiz_id,
                text: request.question,
                score: request.score,
                question_type,
                answer: request.answer,
            })
            .await?;

        tracing::info!(quiz_id, question_id = question.id, "Descriptive question created");
        Ok(question)
    }

    pub async fn create_multiple_options(
        &self,
        user: UserInfo,
        quiz_id: i64,
        request: CreateMultipleOptionsRequest,
    ) -> AppResult<Question> {
        request.validate()?;
        check_score(request.score)?;
        if request.correct_option_index >= request.options.len() {
            return Err(AppError::IndexOutOfRange(request.correct_option_index));
        }
        authorize_quiz(self.quizzes.as_ref(), user, quiz_id).await?;

        let question = self
            .questions
            .create_multiple_options(&NewMultipleOptionsQuestion {
                quiz_id,
                text: request.question,
                score: request.score,
                choices: request.options.into_iter().map(|o| o.text).collect(),
                correct_index: request.correct_option_index,
            })
            .await?;

        tracing::info!(quiz_id, question_id = question.id, "Multiple-options question created");
        Ok(question)
    }

    pub async fn set_correct_option(
        &self,
        user: UserInfo,
        quiz_id: i64,
        question_id: i64,
        choice_id: i64,
    ) -> AppResult<Question> {
        let mut question = self.owned_question(user, quiz_id, question_id).await?;
        if question.question_type.is_descriptive() {
            return Err(AppError::Validation(
                "descriptive questions have no options".to_string(),
            ));
        }
        if !question.has_choice(choice_id) {
            return Err(AppError::WrongOption(choice_id));
        }

        self.questions.set_correct_option(question_id, choice_id).await?;
        question.correct_option_id = Some(choice_id);
        Ok(question)
    }

    pub async fn update_descriptive(
        &self,
        user: UserInfo,
        quiz_id: i64,
        question_id: i64,
        request: UpdateDescriptiveRequest,
    ) -> AppResult<Question> {
        request.validate()?;
        check_score(request.new_score)?;
        let question = self.owned_question(user, quiz_id, question_id).await?;
        if !question.question_type.is_descriptive() {
            return Err(AppError::Validation(
                "question is not descriptive".to_string(),
            ));
        }
        check_reference_answer(question.question_type, request.answer.as_deref())?;

        self.questions
            .update_descriptive(
                question_id,
                &DescriptiveEdit {
                    text: request.text,
                    score: request.new_score,
                    answer: request.answer,
                },
            )
            .await
    }

    pub async fn update_multiple_options(
        &self,
        user: UserInfo,
        quiz_id: i64,
        question_id: i64,
        request: UpdateMultipleOptionsRequest,
    ) -> AppResult<Question> {
        request.validate()?;
        check_score(request.new_score)?;
        let question = self.owned_question(user, quiz_id, question_id).await?;
        if question.question_type.is_descriptive() {
            return Err(AppError::Validation(
                "question is not a multiple-options question".to_string(),
            ));
        }

        let plan = plan_choices(&question.choices, &request.options);
        if plan.final_len() < MIN_CHOICES {
            return Err(AppError::Validation(format!(
                "a multiple-options question needs at least {MIN_CHOICES} choices"
            )));
        }
        if request.correct_option_index >= plan.final_len() {
            return Err(AppError::IndexOutOfRange(request.correct_option_index));
        }

        let question = self
            .questions
            .update_multiple_options(
                question_id,
                &MultipleOptionsEdit {
                    text: request.text,
                    score: request.new_score,
                    plan,
                    correct_index: request.correct_option_index,
                },
            )
            .await?;

        tracing::info!(quiz_id, question_id, "Multiple-options question updated");
        Ok(question)
    }

    /// An active quiz cannot lose its last question; deactivate it first.
    pub async fn delete(&self, user: UserInfo, quiz_id: i64, question_id: i64) -> AppResult<()> {
        let quiz = authorize_quiz(self.quizzes.as_ref(), user, quiz_id).await?;

        if quiz.is_active && self.questions.count_by_quiz(quiz_id).await?.total() <= 1 {
            if self.questions.find_in_quiz(quiz_id, question_id).await?.is_none() {
                return Err(AppError::NotFound("Question not found".to_string()));
            }
            tracing::warn!(quiz_id, question_id, "Refusing to delete the last question of an active quiz");
            return Err(AppError::Validation(
                "an active quiz must keep at least one question".to_string(),
            ));
        }

        if !self.questions.delete(quiz_id, question_id).await? {
            return Err(AppError::NotFound("Question not found".to_string()));
        }

        tracing::info!(quiz_id, question_id, "Question deleted");
        Ok(())
    }
}
