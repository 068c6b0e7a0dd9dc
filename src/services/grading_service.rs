// src/services/grading_service.rs

use std::{collections::HashMap, sync::Arc};

use crate::{
    error::{AppError, AppResult},
    models::{
        participant::{GradableAnswer, GradeAnswersRequest, ParticipantDetail, ScoreInput},
        user::UserInfo,
    },
    repositories::{ParticipantRepository, QuizRepository},
    services::access::authorize_quiz,
};

/// Keeps the requested scores that do not exceed their question's score.
/// Ids the participant does not own are absent from `gradable` and drop out.
pub fn accepted_scores(gradable: &[GradableAnswer], requested: &HashMap<i64, ScoreInput>) -> Vec<(i64, f64)> {
    let mut accepted: Vec<(i64, f64)> = gradable
        .iter()
        .filter_map(|answer| {
            let score = requested.get(&answer.id)?.score;
            if score <= answer.question_score {
                Some((answer.id, score))
            } else {
                tracing::warn!(
                    answer_id = answer.id,
                    score,
                    max = answer.question_score,
                    "Skipping score above question maximum"
                );
                None
            }
        })
        .collect();
    accepted.sort_by_key(|(id, _)| *id);
    accepted
}

/// Owner-side grading of submitted answers.
pub struct GradingService {
    quizzes: Arc<dyn QuizRepository>,
    participants: Arc<dyn ParticipantRepository>,
}

impl GradingService {
    pub fn new(quizzes: Arc<dyn QuizRepository>, participants: Arc<dyn ParticipantRepository>) -> Self {
        Self {
            quizzes,
            participants,
        }
    }

    /// Overwrites descriptive scores that fit under their question's score.
    pub async fn update_descriptive_scores(
        &self,
        participant_id: i64,
        requested: &HashMap<i64, ScoreInput>,
    ) -> AppResult<usize> {
        if requested.is_empty() {
            return Ok(0);
        }

        let ids: Vec<i64> = requested.keys().copied().collect();
        let gradable = self.participants.gradable_answers(participant_id, &ids).await?;
        let accepted = accepted_scores(&gradable, requested);

        if !accepted.is_empty() {
            self.participants
                .set_descriptive_scores(participant_id, &accepted)
                .await?;
        }
        Ok(accepted.len())
    }

    /// true → false, anything else → true.
    pub async fn toggle_multiple_option_correctness(
        &self,
        participant_id: i64,
        answer_ids: &[i64],
    ) -> AppResult<u64> {
        self.participants
            .toggle_correctness(participant_id, answer_ids)
            .await
    }

    pub async fn grade(
        &self,
        user: UserInfo,
        quiz_id: i64,
        participant_id: i64,
        request: GradeAnswersRequest,
    ) -> AppResult<ParticipantDetail> {
        if request.descriptive.values().any(|s| s.score < 0.0) {
            return Err(AppError::Validation("score must not be negative".to_string()));
        }

        authorize_quiz(self.quizzes.as_ref(), user, quiz_id).await?;
        self.participants
            .find_in_quiz(quiz_id, participant_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Participant not found".to_string()))?;

        let scored = self
            .update_descriptive_scores(participant_id, &request.descriptive)
            .await?;
        let toggled = self
            .toggle_multiple_option_correctness(participant_id, &request.multiple_options)
            .await?;
        tracing::info!(quiz_id, participant_id, scored, toggled, "Participant graded");

        self.participants
            .detail(quiz_id, participant_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Participant not found".to_string()))
    }
}
