// src/repositories/quiz_repository.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::quiz::{Quiz, QuizSummary, SettingsChanges},
    repositories::QuizRepository,
};

const QUIZ_COLUMNS: &str = "id, title, owner_id, start_at, end_at, is_active, password, \
                            need_password, shuffle_options, quiz_path";

pub struct PgQuizRepository {
    pool: PgPool,
}

impl PgQuizRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn quiz_not_found() -> AppError {
    AppError::NotFound("Quiz not found".to_string())
}

#[async_trait]
impl QuizRepository for PgQuizRepository {
    async fn create(&self, owner_id: i64, title: &str, quiz_path: &str) -> AppResult<Quiz> {
        let quiz = sqlx::query_as::<_, Quiz>(&format!(
            "INSERT INTO quizzes (title, owner_id, quiz_path) VALUES ($1, $2, $3) RETURNING {QUIZ_COLUMNS}"
        ))
        .bind(title)
        .bind(owner_id)
        .bind(quiz_path)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create quiz: {:?}", e);
            AppError::from(e)
        })?;

        Ok(quiz)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Quiz>> {
        let quiz = sqlx::query_as::<_, Quiz>(&format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(quiz)
    }

    async fn find_by_path(&self, quiz_path: &str) -> AppResult<Option<Quiz>> {
        let quiz = sqlx::query_as::<_, Quiz>(&format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE quiz_path = $1"
        ))
        .bind(quiz_path)
        .fetch_optional(&self.pool)
        .await?;

        Ok(quiz)
    }

    async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<QuizSummary>> {
        let quizzes = sqlx::query_as::<_, QuizSummary>(
            r#"
            SELECT
                q.id,
                q.title,
                q.is_active,
                q.quiz_path,
                COUNT(qu.id) AS question_count
            FROM quizzes q
            LEFT JOIN questions qu ON qu.quiz_id = q.id
            WHERE q.owner_id = $1
            GROUP BY q.id
            ORDER BY q.id DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list quizzes: {:?}", e);
            AppError::from(e)
        })?;

        Ok(quizzes)
    }

    async fn path_taken(&self, quiz_path: &str, except_id: Option<i64>) -> AppResult<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM quizzes WHERE quiz_path = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(quiz_path)
        .bind(except_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    async fn update_settings(&self, id: i64, changes: &SettingsChanges) -> AppResult<Quiz> {
        // A single UPDATE statement, so all validated fields land together.
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE quizzes SET updated_at = NOW()");

        if let Some(title) = &changes.title {
            builder.push(", title = ");
            builder.push_bind(title.clone());
        }

        if let Some((start_at, end_at)) = changes.window {
            builder.push(", start_at = ");
            builder.push_bind(start_at);
            builder.push(", end_at = ");
            builder.push_bind(end_at);
        }

        if let Some(quiz_path) = &changes.quiz_path {
            builder.push(", quiz_path = ");
            builder.push_bind(quiz_path.clone());
        }

        if let Some(shuffle) = changes.shuffle_options {
            builder.push(", shuffle_options = ");
            builder.push_bind(shuffle);
        }

        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(format!(" RETURNING {QUIZ_COLUMNS}"));

        let quiz = builder
            .build_query_as::<Quiz>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update quiz settings: {:?}", e);
                AppError::from(e)
            })?
            .ok_or_else(quiz_not_found)?;

        Ok(quiz)
    }

    async fn set_active(&self, id: i64, is_active: bool) -> AppResult<Quiz> {
        sqlx::query_as::<_, Quiz>(&format!(
            "UPDATE quizzes SET is_active = $1, updated_at = NOW() WHERE id = $2 RETURNING {QUIZ_COLUMNS}"
        ))
        .bind(is_active)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(quiz_not_found)
    }

    async fn set_password(&self, id: i64, password: &str, need_password: bool) -> AppResult<Quiz> {
        sqlx::query_as::<_, Quiz>(&format!(
            "UPDATE quizzes SET password = $1, need_password = $2, updated_at = NOW() WHERE id = $3 RETURNING {QUIZ_COLUMNS}"
        ))
        .bind(password)
        .bind(need_password)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(quiz_not_found)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM quizzes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete quiz: {:?}", e);
                AppError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
