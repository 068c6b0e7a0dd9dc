// src/repositories/memory.rs
//
// In-process store backing every repository trait. Used when no DATABASE_URL is
// configured and by the test-suite. Each operation holds the single write lock
// for its whole duration, so multi-row operations are atomic, and foreign-key
// cascades are applied by hand.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{
        participant::{
            DescriptiveAnswer, GradableAnswer, MultipleOptionAnswer, NewParticipant, Participant,
            ParticipantDetail, ParticipantScore,
        },
        question::{
            Choice, DescriptiveEdit, MultipleOptionsEdit, NewDescriptiveQuestion,
            NewMultipleOptionsQuestion, Question, QuestionCounts, QuestionFamily, QuestionRow,
            QuestionType, ReferenceAnswer,
        },
        quiz::{Quiz, QuizSummary, SettingsChanges},
        user::User,
    },
    repositories::{ParticipantRepository, QuestionRepository, QuizRepository, UserRepository},
};

#[derive(Debug, Clone)]
struct StoredDescriptiveAnswer {
    id: i64,
    participant_id: i64,
    question_id: i64,
    answer: String,
    score: f64,
}

#[derive(Debug, Clone)]
struct StoredChoiceAnswer {
    id: i64,
    participant_id: i64,
    question_id: i64,
    choice_id: i64,
    is_correct: Option<bool>,
}

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    quizzes: BTreeMap<i64, Quiz>,
    questions: BTreeMap<i64, QuestionRow>,
    choices: BTreeMap<i64, Choice>,
    /// Keyed by question id.
    reference_answers: HashMap<i64, ReferenceAnswer>,
    /// question id → choice id
    correct_options: HashMap<i64, i64>,
    participants: BTreeMap<i64, Participant>,
    descriptive_answers: BTreeMap<i64, StoredDescriptiveAnswer>,
    choice_answers: BTreeMap<i64, StoredChoiceAnswer>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn question(&self, row: &QuestionRow) -> Question {
        let mut question = Question::from_row(row.clone());
        question.choices = self
            .choices
            .values()
            .filter(|c| c.question_id == row.id)
            .cloned()
            .collect();
        question.answer = self.reference_answers.get(&row.id).cloned();
        question.correct_option_id = self.correct_options.get(&row.id).copied();
        question
    }

    fn question_type(&self, question_id: i64) -> Option<QuestionType> {
        self.questions.get(&question_id).map(|q| q.question_type)
    }

    fn remove_choice(&mut self, choice_id: i64) {
        self.choices.remove(&choice_id);
        self.correct_options.retain(|_, c| *c != choice_id);
        self.choice_answers.retain(|_, a| a.choice_id != choice_id);
    }

    fn remove_question(&mut self, question_id: i64) {
        self.questions.remove(&question_id);
        let choice_ids: Vec<i64> = self
            .choices
            .values()
            .filter(|c| c.question_id == question_id)
            .map(|c| c.id)
            .collect();
        for id in choice_ids {
            self.remove_choice(id);
        }
        self.reference_answers.remove(&question_id);
        self.correct_options.remove(&question_id);
        self.descriptive_answers.retain(|_, a| a.question_id != question_id);
        self.choice_answers.retain(|_, a| a.question_id != question_id);
    }

    fn remove_participant(&mut self, participant_id: i64) {
        self.participants.remove(&participant_id);
        self.descriptive_answers
            .retain(|_, a| a.participant_id != participant_id);
        self.choice_answers
            .retain(|_, a| a.participant_id != participant_id);
    }

    fn remove_quiz(&mut self, quiz_id: i64) -> bool {
        if self.quizzes.remove(&quiz_id).is_none() {
            return false;
        }
        let question_ids: Vec<i64> = self
            .questions
            .values()
            .filter(|q| q.quiz_id == quiz_id)
            .map(|q| q.id)
            .collect();
        for id in question_ids {
            self.remove_question(id);
        }
        let participant_ids: Vec<i64> = self
            .participants
            .values()
            .filter(|p| p.quiz_id == quiz_id)
            .map(|p| p.id)
            .collect();
        for id in participant_ids {
            self.remove_participant(id);
        }
        true
    }

    fn quiz_mut(&mut self, id: i64) -> AppResult<&mut Quiz> {
        self.quizzes
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))
    }

    fn path_taken(&self, quiz_path: &str, except_id: Option<i64>) -> bool {
        self.quizzes
            .values()
            .any(|q| q.quiz_path == quiz_path && Some(q.id) != except_id)
    }

    fn insert_question(&mut self, quiz_id: i64, text: &str, score: f64, question_type: QuestionType) -> AppResult<QuestionRow> {
        if !self.quizzes.contains_key(&quiz_id) {
            return Err(AppError::NotFound("Quiz not found".to_string()));
        }
        let row = QuestionRow {
            id: self.next_id(),
            quiz_id,
            text: text.to_string(),
            score,
            question_type,
        };
        self.questions.insert(row.id, row.clone());
        Ok(row)
    }

    fn insert_choice(&mut self, question_id: i64, text: &str) -> i64 {
        let id = self.next_id();
        self.choices.insert(
            id,
            Choice {
                id,
                question_id,
                text: text.to_string(),
            },
        );
        id
    }
}

/// Shared in-memory tables. Clone the `Arc` that holds it, never the store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuizRepository for MemoryStore {
    async fn create(&self, owner_id: i64, title: &str, quiz_path: &str) -> AppResult<Quiz> {
        let mut tables = self.tables.write().await;
        if tables.path_taken(quiz_path, None) {
            return Err(AppError::Conflict("quiz path already exists".to_string()));
        }
        let quiz = Quiz {
            id: tables.next_id(),
            title: title.to_string(),
            owner_id,
            start_at: None,
            end_at: None,
            is_active: false,
            password: None,
            need_password: false,
            shuffle_options: false,
            quiz_path: quiz_path.to_string(),
        };
        tables.quizzes.insert(quiz.id, quiz.clone());
        Ok(quiz)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Quiz>> {
        Ok(self.tables.read().await.quizzes.get(&id).cloned())
    }

    async fn find_by_path(&self, quiz_path: &str) -> AppResult<Option<Quiz>> {
        let tables = self.tables.read().await;
        Ok(tables
            .quizzes
            .values()
            .find(|q| q.quiz_path == quiz_path)
            .cloned())
    }

    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<QuizSummary>> {
        let tables = self.tables.read().await;
        Ok(tables
            .quizzes
            .values()
            .rev()
            .filter(|q| q.owner_id == owner_id)
            .map(|q| QuizSummary {
                id: q.id,
                title: q.title.clone(),
                is_active: q.is_active,
                quiz_path: q.quiz_path.clone(),
                question_count: tables
                    .questions
                    .values()
                    .filter(|question| question.quiz_id == q.id)
                    .count() as i64,
            })
            .collect())
    }

    async fn path_taken(&self, quiz_path: &str, except_id: Option<i64>) -> AppResult<bool> {
        Ok(self.tables.read().await.path_taken(quiz_path, except_id))
    }

    async fn update_settings(&self, id: i64, changes: &SettingsChanges) -> AppResult<Quiz> {
        let mut tables = self.tables.write().await;
        if let Some(path) = &changes.quiz_path {
            if tables.path_taken(path, Some(id)) {
                return Err(AppError::Conflict("quiz path already exists".to_string()));
            }
        }
        let quiz = tables.quiz_mut(id)?;
        if let Some(title) = &changes.title {
            quiz.title = title.clone();
        }
        if let Some((start_at, end_at)) = changes.window {
            quiz.start_at = Some(start_at);
            quiz.end_at = Some(end_at);
        }
        if let Some(path) = &changes.quiz_path {
            quiz.quiz_path = path.clone();
        }
        if let Some(shuffle) = changes.shuffle_options {
            quiz.shuffle_options = shuffle;
        }
        Ok(quiz.clone())
    }

    async fn set_active(&self, id: i64, is_active: bool) -> AppResult<Quiz> {
        let mut tables = self.tables.write().await;
        let quiz = tables.quiz_mut(id)?;
        quiz.is_active = is_active;
        Ok(quiz.clone())
    }

    async fn set_password(&self, id: i64, password: &str, need_password: bool) -> AppResult<Quiz> {
        let mut tables = self.tables.write().await;
        let quiz = tables.quiz_mut(id)?;
        quiz.password = Some(password.to_string());
        quiz.need_password = need_password;
        Ok(quiz.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        Ok(self.tables.write().await.remove_quiz(id))
    }
}

#[async_trait]
impl QuestionRepository for MemoryStore {
    async fn create_descriptive(&self, new: &NewDescriptiveQuestion) -> AppResult<Question> {
        let mut tables = self.tables.write().await;
        let row = tables.insert_question(new.quiz_id, &new.text, new.score, new.question_type)?;
        if let Some(answer) = new.answer.as_deref().filter(|a| !a.is_empty()) {
            let reference = ReferenceAnswer {
                id: tables.next_id(),
                question_id: row.id,
                answer: Some(answer.to_string()),
            };
            tables.reference_answers.insert(row.id, reference);
        }
        Ok(tables.question(&row))
    }

    async fn create_multiple_options(&self, new: &NewMultipleOptionsQuestion) -> AppResult<Question> {
        let mut tables = self.tables.write().await;
        if new.correct_index >= new.choices.len() {
            return Err(AppError::IndexOutOfRange(new.correct_index));
        }
        let row = tables.insert_question(
            new.quiz_id,
            &new.text,
            new.score,
            QuestionType::MultipleOptions,
        )?;
        let ids: Vec<i64> = new
            .choices
            .iter()
            .map(|text| tables.insert_choice(row.id, text))
            .collect();
        tables.correct_options.insert(row.id, ids[new.correct_index]);
        Ok(tables.question(&row))
    }

    async fn find_in_quiz(&self, quiz_id: i64, question_id: i64) -> AppResult<Option<Question>> {
        let tables = self.tables.read().await;
        Ok(tables
            .questions
            .get(&question_id)
            .filter(|q| q.quiz_id == quiz_id)
            .map(|q| tables.question(q)))
    }

    async fn list_by_quiz(&self, quiz_id: i64) -> AppResult<Vec<Question>> {
        let tables = self.tables.read().await;
        Ok(tables
            .questions
            .values()
            .filter(|q| q.quiz_id == quiz_id)
            .map(|q| tables.question(q))
            .collect())
    }

    async fn count_by_quiz(&self, quiz_id: i64) -> AppResult<QuestionCounts> {
        let tables = self.tables.read().await;
        let mut counts = QuestionCounts::default();
        for question in tables.questions.values().filter(|q| q.quiz_id == quiz_id) {
            if question.question_type.is_descriptive() {
                counts.descriptive += 1;
            } else {
                counts.multiple_options += 1;
            }
        }
        Ok(counts)
    }

    async fn find_by_ids(
        &self,
        quiz_id: i64,
        ids: &[i64],
        family: QuestionFamily,
    ) -> AppResult<Vec<Question>> {
        let tables = self.tables.read().await;
        Ok(tables
            .questions
            .values()
            .filter(|q| {
                q.quiz_id == quiz_id && family.contains(q.question_type) && ids.contains(&q.id)
            })
            .map(|q| tables.question(q))
            .collect())
    }

    async fn set_correct_option(&self, question_id: i64, choice_id: i64) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.questions.contains_key(&question_id) || !tables.choices.contains_key(&choice_id) {
            return Err(AppError::NotFound("Question or choice not found".to_string()));
        }
        tables.correct_options.insert(question_id, choice_id);
        Ok(())
    }

    async fn update_descriptive(&self, question_id: i64, edit: &DescriptiveEdit) -> AppResult<Question> {
        let mut tables = self.tables.write().await;
        let row = {
            let row = tables
                .questions
                .get_mut(&question_id)
                .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;
            row.text = edit.text.clone();
            row.score = edit.score;
            row.clone()
        };
        match tables.reference_answers.get_mut(&question_id) {
            Some(reference) => reference.answer = edit.answer.clone(),
            None => {
                let reference = ReferenceAnswer {
                    id: tables.next_id(),
                    question_id,
                    answer: edit.answer.clone(),
                };
                tables.reference_answers.insert(question_id, reference);
            }
        }
        Ok(tables.question(&row))
    }

    async fn update_multiple_options(
        &self,
        question_id: i64,
        edit: &MultipleOptionsEdit,
    ) -> AppResult<Question> {
        let mut tables = self.tables.write().await;
        if !tables.questions.contains_key(&question_id) {
            return Err(AppError::NotFound("Question not found".to_string()));
        }

        // Everything below must be validated before the first write.
        let surviving = tables
            .choices
            .values()
            .filter(|c| c.question_id == question_id && !edit.plan.deletes.contains(&c.id))
            .count();
        if edit.correct_index >= surviving + edit.plan.inserts.len() {
            return Err(AppError::IndexOutOfRange(edit.correct_index));
        }

        if let Some(row) = tables.questions.get_mut(&question_id) {
            row.text = edit.text.clone();
            row.score = edit.score;
        }
        for (choice_id, text) in &edit.plan.updates {
            if let Some(choice) = tables
                .choices
                .get_mut(choice_id)
                .filter(|c| c.question_id == question_id)
            {
                choice.text = text.clone();
            }
        }
        for choice_id in &edit.plan.deletes {
            if tables
                .choices
                .get(choice_id)
                .is_some_and(|c| c.question_id == question_id)
            {
                tables.remove_choice(*choice_id);
            }
        }
        for text in &edit.plan.inserts {
            tables.insert_choice(question_id, text);
        }

        let final_ids: Vec<i64> = tables
            .choices
            .values()
            .filter(|c| c.question_id == question_id)
            .map(|c| c.id)
            .collect();
        let correct_id = final_ids
            .get(edit.correct_index)
            .copied()
            .ok_or(AppError::IndexOutOfRange(edit.correct_index))?;
        tables.correct_options.insert(question_id, correct_id);

        let row = tables
            .questions
            .get(&question_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;
        Ok(tables.question(&row))
    }

    async fn delete(&self, quiz_id: i64, question_id: i64) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables
            .questions
            .get(&question_id)
            .is_some_and(|q| q.quiz_id == quiz_id)
        {
            return Ok(false);
        }
        tables.remove_question(question_id);
        Ok(true)
    }

    async fn total_score(&self, quiz_id: i64) -> AppResult<f64> {
        let tables = self.tables.read().await;
        Ok(tables
            .questions
            .values()
            .filter(|q| q.quiz_id == quiz_id)
            .map(|q| q.score)
            .sum())
    }
}

#[async_trait]
impl ParticipantRepository for MemoryStore {
    async fn create_with_answers(&self, new: &NewParticipant) -> AppResult<Participant> {
        let mut tables = self.tables.write().await;
        if tables.participants.values().any(|p| p.username == new.username) {
            return Err(AppError::Conflict("username already exists".to_string()));
        }
        let referenced_ok = new
            .descriptive
            .iter()
            .all(|a| tables.questions.contains_key(&a.question_id))
            && new.multiple_options.iter().all(|a| {
                tables.questions.contains_key(&a.question_id)
                    && tables.choices.contains_key(&a.option_id)
            });
        if !referenced_ok {
            return Err(AppError::InternalServerError(
                "answer references a missing row".to_string(),
            ));
        }

        let participant = Participant {
            id: tables.next_id(),
            quiz_id: new.quiz_id,
            username: new.username.clone(),
            created_at: Utc::now(),
        };
        tables.participants.insert(participant.id, participant.clone());

        for answer in &new.descriptive {
            let id = tables.next_id();
            tables.descriptive_answers.insert(
                id,
                StoredDescriptiveAnswer {
                    id,
                    participant_id: participant.id,
                    question_id: answer.question_id,
                    answer: answer.answer.clone(),
                    score: 0.0,
                },
            );
        }
        for answer in &new.multiple_options {
            let id = tables.next_id();
            tables.choice_answers.insert(
                id,
                StoredChoiceAnswer {
                    id,
                    participant_id: participant.id,
                    question_id: answer.question_id,
                    choice_id: answer.option_id,
                    is_correct: None,
                },
            );
        }

        Ok(participant)
    }

    async fn find_in_quiz(&self, quiz_id: i64, participant_id: i64) -> AppResult<Option<Participant>> {
        let tables = self.tables.read().await;
        Ok(tables
            .participants
            .get(&participant_id)
            .filter(|p| p.quiz_id == quiz_id)
            .cloned())
    }

    async fn detail(&self, quiz_id: i64, participant_id: i64) -> AppResult<Option<ParticipantDetail>> {
        let tables = self.tables.read().await;
        let Some(participant) = tables
            .participants
            .get(&participant_id)
            .filter(|p| p.quiz_id == quiz_id)
        else {
            return Ok(None);
        };

        let descriptive = tables
            .descriptive_answers
            .values()
            .filter(|a| a.participant_id == participant_id)
            .filter_map(|a| {
                Some(DescriptiveAnswer {
                    id: a.id,
                    question_id: a.question_id,
                    answer: a.answer.clone(),
                    score: a.score,
                    question_type: tables.question_type(a.question_id)?,
                })
            })
            .collect();

        let multiple_options = tables
            .choice_answers
            .values()
            .filter(|a| a.participant_id == participant_id)
            .filter_map(|a| {
                Some(MultipleOptionAnswer {
                    id: a.id,
                    question_id: a.question_id,
                    choice_id: a.choice_id,
                    is_correct: a.is_correct,
                    question_type: tables.question_type(a.question_id)?,
                })
            })
            .collect();

        Ok(Some(ParticipantDetail {
            id: participant.id,
            username: participant.username.clone(),
            descriptive,
            multiple_options,
        }))
    }

    async fn scores(&self, quiz_id: i64) -> AppResult<Vec<ParticipantScore>> {
        let tables = self.tables.read().await;
        Ok(tables
            .participants
            .values()
            .filter(|p| p.quiz_id == quiz_id)
            .map(|p| ParticipantScore {
                username: p.username.clone(),
                participant_id: p.id,
                descriptive_score: tables
                    .descriptive_answers
                    .values()
                    .filter(|a| a.participant_id == p.id)
                    .map(|a| a.score)
                    .sum(),
                options_score: tables
                    .choice_answers
                    .values()
                    .filter(|a| a.participant_id == p.id && a.is_correct == Some(true))
                    .filter_map(|a| tables.questions.get(&a.question_id))
                    .map(|q| q.score)
                    .sum(),
            })
            .collect())
    }

    async fn gradable_answers(&self, participant_id: i64, ids: &[i64]) -> AppResult<Vec<GradableAnswer>> {
        let tables = self.tables.read().await;
        Ok(tables
            .descriptive_answers
            .values()
            .filter(|a| a.participant_id == participant_id && ids.contains(&a.id))
            .filter_map(|a| {
                tables.questions.get(&a.question_id).map(|q| GradableAnswer {
                    id: a.id,
                    question_score: q.score,
                })
            })
            .collect())
    }

    async fn set_descriptive_scores(&self, participant_id: i64, scores: &[(i64, f64)]) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        for (answer_id, score) in scores {
            if let Some(answer) = tables
                .descriptive_answers
                .get_mut(answer_id)
                .filter(|a| a.participant_id == participant_id)
            {
                answer.score = *score;
            }
        }
        Ok(())
    }

    async fn toggle_correctness(&self, participant_id: i64, answer_ids: &[i64]) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let mut flipped = 0;
        for answer in tables
            .choice_answers
            .values_mut()
            .filter(|a| a.participant_id == participant_id && answer_ids.contains(&a.id))
        {
            answer.is_correct = Some(answer.is_correct != Some(true));
            flipped += 1;
        }
        Ok(flipped)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().any(|u| u.email == email))
    }

    async fn create(
        &self,
        email: &str,
        full_name: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == email) {
            return Err(AppError::Conflict("email already exists".to_string()));
        }
        let user = User {
            id: tables.next_id(),
            email: email.to_string(),
            full_name: full_name.to_string(),
            password: password_hash.to_string(),
            is_admin,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        participant::{DescriptiveAnswerInput, MultipleOptionAnswerInput},
        question::ChoicePlan,
    };

    async fn quiz_with_choice_question(store: &MemoryStore) -> (Quiz, Question) {
        let quiz = QuizRepository::create(store, 1, "Rust basics", "rust-basics")
            .await
            .unwrap();
        let question = store
            .create_multiple_options(&NewMultipleOptionsQuestion {
                quiz_id: quiz.id,
                text: "Pick one".to_string(),
                score: 2.0,
                choices: vec!["A".into(), "B".into(), "C".into()],
                correct_index: 1,
            })
            .await
            .unwrap();
        (quiz, question)
    }

    #[tokio::test]
    async fn test_create_multiple_options_resolves_correct_index() {
        let store = MemoryStore::new();
        let (_, question) = quiz_with_choice_question(&store).await;
        assert_eq!(question.choices.len(), 3);
        assert_eq!(question.correct_option_id, Some(question.choices[1].id));
    }

    #[tokio::test]
    async fn test_out_of_range_update_leaves_question_untouched() {
        let store = MemoryStore::new();
        let (quiz, question) = quiz_with_choice_question(&store).await;

        let edit = MultipleOptionsEdit {
            text: "Changed".to_string(),
            score: 5.0,
            plan: ChoicePlan {
                updates: vec![(question.choices[0].id, "A2".into())],
                inserts: vec![],
                deletes: vec![question.choices[1].id, question.choices[2].id],
            },
            correct_index: 3,
        };
        let err = store
            .update_multiple_options(question.id, &edit)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::IndexOutOfRange(3)));

        let stored = QuestionRepository::find_in_quiz(&store, quiz.id, question.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.text, "Pick one");
        assert_eq!(stored.choices.len(), 3);
    }

    #[tokio::test]
    async fn test_deleting_quiz_cascades() {
        let store = MemoryStore::new();
        let (quiz, question) = quiz_with_choice_question(&store).await;
        store
            .create_with_answers(&NewParticipant {
                quiz_id: quiz.id,
                username: "bob+abcdefgh".into(),
                descriptive: Vec::<DescriptiveAnswerInput>::new(),
                multiple_options: vec![MultipleOptionAnswerInput {
                    question_id: question.id,
                    option_id: question.choices[0].id,
                }],
            })
            .await
            .unwrap();

        assert!(QuizRepository::delete(&store, quiz.id).await.unwrap());
        assert!(store.list_by_quiz(quiz.id).await.unwrap().is_empty());
        assert!(store.scores(quiz.id).await.unwrap().is_empty());
        assert!(!QuizRepository::delete(&store, quiz.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_toggle_flips_unset_to_true_then_false() {
        let store = MemoryStore::new();
        let (quiz, question) = quiz_with_choice_question(&store).await;
        let participant = store
            .create_with_answers(&NewParticipant {
                quiz_id: quiz.id,
                username: "eve+abcdefgh".into(),
                descriptive: vec![],
                multiple_options: vec![MultipleOptionAnswerInput {
                    question_id: question.id,
                    option_id: question.choices[1].id,
                }],
            })
            .await
            .unwrap();
        let detail = store.detail(quiz.id, participant.id).await.unwrap().unwrap();
        let answer_id = detail.multiple_options[0].id;
        assert_eq!(detail.multiple_options[0].is_correct, None);

        store.toggle_correctness(participant.id, &[answer_id]).await.unwrap();
        let scores = store.scores(quiz.id).await.unwrap();
        assert_eq!(scores[0].options_score, 2.0);

        store.toggle_correctness(participant.id, &[answer_id]).await.unwrap();
        let scores = store.scores(quiz.id).await.unwrap();
        assert_eq!(scores[0].options_score, 0.0);
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryStore::new();
        let (quiz, _) = quiz_with_choice_question(&store).await;
        let new = NewParticipant {
            quiz_id: quiz.id,
            username: "same+abcdefgh".into(),
            descriptive: vec![],
            multiple_options: vec![],
        };
        store.create_with_answers(&new).await.unwrap();
        assert!(matches!(
            store.create_with_answers(&new).await,
            Err(AppError::Conflict(_))
        ));
    }
}
