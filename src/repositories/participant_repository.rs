// src/repositories/participant_repository.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::participant::{
        DescriptiveAnswer, GradableAnswer, MultipleOptionAnswer, NewParticipant, Participant,
        ParticipantDetail, ParticipantScore,
    },
    repositories::ParticipantRepository,
};

pub struct PgParticipantRepository {
    pool: PgPool,
}

impl PgParticipantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParticipantRepository for PgParticipantRepository {
    async fn create_with_answers(&self, new: &NewParticipant) -> AppResult<Participant> {
        let mut tx = self.pool.begin().await?;

        let participant = sqlx::query_as::<_, Participant>(
            r#"
            INSERT INTO participants (quiz_id, username)
            VALUES ($1, $2)
            RETURNING id, quiz_id, username, created_at
            "#,
        )
        .bind(new.quiz_id)
        .bind(&new.username)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create participant: {:?}", e);
            AppError::from(e)
        })?;

        for answer in &new.descriptive {
            sqlx::query(
                "INSERT INTO participant_descriptive_answers (participant_id, question_id, answer) VALUES ($1, $2, $3)",
            )
            .bind(participant.id)
            .bind(answer.question_id)
            .bind(&answer.answer)
            .execute(&mut *tx)
            .await?;
        }

        for answer in &new.multiple_options {
            sqlx::query(
                "INSERT INTO participant_multiple_option_answers (participant_id, question_id, choice_id) VALUES ($1, $2, $3)",
            )
            .bind(participant.id)
            .bind(answer.question_id)
            .bind(answer.option_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(participant)
    }

    async fn find_in_quiz(&self, quiz_id: i64, participant_id: i64) -> AppResult<Option<Participant>> {
        let participant = sqlx::query_as::<_, Participant>(
            "SELECT id, quiz_id, username, created_at FROM participants WHERE id = $1 AND quiz_id = $2",
        )
        .bind(participant_id)
        .bind(quiz_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(participant)
    }

    async fn detail(&self, quiz_id: i64, participant_id: i64) -> AppResult<Option<ParticipantDetail>> {
        let Some(participant) = self.find_in_quiz(quiz_id, participant_id).await? else {
            return Ok(None);
        };

        let descriptive = sqlx::query_as::<_, DescriptiveAnswer>(
            r#"
            SELECT d.id, d.question_id, d.answer, d.score, q.question_type
            FROM participant_descriptive_answers d
            JOIN questions q ON q.id = d.question_id
            WHERE d.participant_id = $1
            ORDER BY d.id
            "#,
        )
        .bind(participant.id)
        .fetch_all(&self.pool)
        .await?;

        let multiple_options = sqlx::query_as::<_, MultipleOptionAnswer>(
            r#"
            SELECT m.id, m.question_id, m.choice_id, m.is_correct, q.question_type
            FROM participant_multiple_option_answers m
            JOIN questions q ON q.id = m.question_id
            WHERE m.participant_id = $1
            ORDER BY m.id
            "#,
        )
        .bind(participant.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(ParticipantDetail {
            id: participant.id,
            username: participant.username,
            descriptive,
            multiple_options,
        }))
    }

    async fn scores(&self, quiz_id: i64) -> AppResult<Vec<ParticipantScore>> {
        let scores = sqlx::query_as::<_, ParticipantScore>(
            r#"
            SELECT
                p.username,
                p.id AS participant_id,
                COALESCE((
                    SELECT SUM(d.score)
                    FROM participant_descriptive_answers d
                    WHERE d.participant_id = p.id
                ), 0)::DOUBLE PRECISION AS descriptive_score,
                COALESCE((
                    SELECT SUM(q.score)
                    FROM participant_multiple_option_answers m
                    JOIN questions q ON q.id = m.question_id
                    WHERE m.participant_id = p.id AND m.is_correct = TRUE
                ), 0)::DOUBLE PRECISION AS options_score
            FROM participants p
            WHERE p.quiz_id = $1
            ORDER BY p.id
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to aggregate participant scores: {:?}", e);
            AppError::from(e)
        })?;

        Ok(scores)
    }

    async fn gradable_answers(&self, participant_id: i64, ids: &[i64]) -> AppResult<Vec<GradableAnswer>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let answers = sqlx::query_as::<_, GradableAnswer>(
            r#"
            SELECT d.id, q.score AS question_score
            FROM participant_descriptive_answers d
            JOIN questions q ON q.id = d.question_id
            WHERE d.participant_id = $1 AND d.id = ANY($2)
            "#,
        )
        .bind(participant_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(answers)
    }

    async fn set_descriptive_scores(&self, participant_id: i64, scores: &[(i64, f64)]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        for (answer_id, score) in scores {
            sqlx::query(
                "UPDATE participant_descriptive_answers SET score = $1 WHERE id = $2 AND participant_id = $3",
            )
            .bind(score)
            .bind(answer_id)
            .bind(participant_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn toggle_correctness(&self, participant_id: i64, answer_ids: &[i64]) -> AppResult<u64> {
        if answer_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            UPDATE participant_multiple_option_answers
            SET is_correct = CASE WHEN is_correct = TRUE THEN FALSE ELSE TRUE END
            WHERE participant_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(participant_id)
        .bind(answer_ids)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to toggle answer correctness: {:?}", e);
            AppError::from(e)
        })?;

        Ok(result.rows_affected())
    }
}
