// src/repositories/question_repository.rs

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::question::{
        Choice, DescriptiveEdit, MultipleOptionsEdit, NewDescriptiveQuestion,
        NewMultipleOptionsQuestion, Question, QuestionCounts, QuestionFamily, QuestionRow,
        QuestionType, ReferenceAnswer,
    },
    repositories::QuestionRepository,
};

pub struct PgQuestionRepository {
    pool: PgPool,
}

impl PgQuestionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn question_not_found() -> AppError {
    AppError::NotFound("Question not found".to_string())
}

/// Eagerly loads choices, reference answers and correct options for the given rows.
async fn load_children(conn: &mut PgConnection, rows: Vec<QuestionRow>) -> AppResult<Vec<Question>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();

    let choices = sqlx::query_as::<_, Choice>(
        "SELECT id, question_id, text FROM choices WHERE question_id = ANY($1) ORDER BY id",
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await?;

    let answers = sqlx::query_as::<_, ReferenceAnswer>(
        "SELECT id, question_id, answer FROM reference_answers WHERE question_id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await?;

    let correct: HashMap<i64, i64> = sqlx::query_as::<_, (i64, i64)>(
        "SELECT question_id, choice_id FROM correct_options WHERE question_id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .collect();

    let mut choices_by_question: HashMap<i64, Vec<Choice>> = HashMap::new();
    for choice in choices {
        choices_by_question
            .entry(choice.question_id)
            .or_default()
            .push(choice);
    }
    let mut answer_by_question: HashMap<i64, ReferenceAnswer> = answers
        .into_iter()
        .map(|a| (a.question_id, a))
        .collect();

    Ok(rows
        .into_iter()
        .map(|row| {
            let id = row.id;
            let mut question = Question::from_row(row);
            question.choices = choices_by_question.remove(&id).unwrap_or_default();
            question.answer = answer_by_question.remove(&id);
            question.correct_option_id = correct.get(&id).copied();
            question
        })
        .collect())
}

async fn load_one(conn: &mut PgConnection, question_id: i64) -> AppResult<Question> {
    let row = sqlx::query_as::<_, QuestionRow>(
        "SELECT id, quiz_id, text, score, question_type FROM questions WHERE id = $1",
    )
    .bind(question_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(question_not_found)?;

    load_children(conn, vec![row])
        .await?
        .pop()
        .ok_or_else(question_not_found)
}

async fn upsert_correct_option(conn: &mut PgConnection, question_id: i64, choice_id: i64) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO correct_options (question_id, choice_id)
        VALUES ($1, $2)
        ON CONFLICT (question_id) DO UPDATE SET choice_id = EXCLUDED.choice_id
        "#,
    )
    .bind(question_id)
    .bind(choice_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

#[async_trait]
impl QuestionRepository for PgQuestionRepository {
    async fn create_descriptive(&self, new: &NewDescriptiveQuestion) -> AppResult<Question> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, QuestionRow>(
            r#"
            INSERT INTO questions (quiz_id, text, question_type, score)
            VALUES ($1, $2, $3, $4)
            RETURNING id, quiz_id, text, score, question_type
            "#,
        )
        .bind(new.quiz_id)
        .bind(&new.text)
        .bind(new.question_type)
        .bind(new.score)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create descriptive question: {:?}", e);
            AppError::from(e)
        })?;

        let mut question = Question::from_row(row);

        if let Some(answer) = new.answer.as_deref().filter(|a| !a.is_empty()) {
            let reference = sqlx::query_as::<_, ReferenceAnswer>(
                "INSERT INTO reference_answers (question_id, answer) VALUES ($1, $2) RETURNING id, question_id, answer",
            )
            .bind(question.id)
            .bind(answer)
            .fetch_one(&mut *tx)
            .await?;
            question.answer = Some(reference);
        }

        tx.commit().await?;
        Ok(question)
    }

    async fn create_multiple_options(&self, new: &NewMultipleOptionsQuestion) -> AppResult<Question> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, QuestionRow>(
            r#"
            INSERT INTO questions (quiz_id, text, question_type, score)
            VALUES ($1, $2, $3, $4)
            RETURNING id, quiz_id, text, score, question_type
            "#,
        )
        .bind(new.quiz_id)
        .bind(&new.text)
        .bind(QuestionType::MultipleOptions)
        .bind(new.score)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create multiple-options question: {:?}", e);
            AppError::from(e)
        })?;

        let mut question = Question::from_row(row);

        for text in &new.choices {
            let choice = sqlx::query_as::<_, Choice>(
                "INSERT INTO choices (question_id, text) VALUES ($1, $2) RETURNING id, question_id, text",
            )
            .bind(question.id)
            .bind(text)
            .fetch_one(&mut *tx)
            .await?;
            question.choices.push(choice);
        }

        let correct_id = question
            .choices
            .get(new.correct_index)
            .map(|c| c.id)
            .ok_or(AppError::IndexOutOfRange(new.correct_index))?;
        upsert_correct_option(&mut tx, question.id, correct_id).await?;
        question.correct_option_id = Some(correct_id);

        tx.commit().await?;
        Ok(question)
    }

    async fn find_in_quiz(&self, quiz_id: i64, question_id: i64) -> AppResult<Option<Question>> {
        let mut conn = self.pool.acquire().await?;

        let row = sqlx::query_as::<_, QuestionRow>(
            "SELECT id, quiz_id, text, score, question_type FROM questions WHERE id = $1 AND quiz_id = $2",
        )
        .bind(question_id)
        .bind(quiz_id)
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            Some(row) => Ok(load_children(&mut conn, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_by_quiz(&self, quiz_id: i64) -> AppResult<Vec<Question>> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query_as::<_, QuestionRow>(
            "SELECT id, quiz_id, text, score, question_type FROM questions WHERE quiz_id = $1 ORDER BY id",
        )
        .bind(quiz_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list questions: {:?}", e);
            AppError::from(e)
        })?;

        load_children(&mut conn, rows).await
    }

    async fn count_by_quiz(&self, quiz_id: i64) -> AppResult<QuestionCounts> {
        let counts = sqlx::query_as::<_, QuestionCounts>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE question_type <> 'multiple_options') AS descriptive,
                COUNT(*) FILTER (WHERE question_type = 'multiple_options') AS multiple_options
            FROM questions
            WHERE quiz_id = $1
            "#,
        )
        .bind(quiz_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }

    async fn find_by_ids(
        &self,
        quiz_id: i64,
        ids: &[i64],
        family: QuestionFamily,
    ) -> AppResult<Vec<Question>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query_builder = QueryBuilder::<Postgres>::new(
            "SELECT id, quiz_id, text, score, question_type FROM questions WHERE quiz_id = ",
        );
        query_builder.push_bind(quiz_id);
        query_builder.push(match family {
            QuestionFamily::Descriptive => " AND question_type <> 'multiple_options'",
            QuestionFamily::MultipleOptions => " AND question_type = 'multiple_options'",
        });
        query_builder.push(" AND id IN (");
        let mut separated = query_builder.separated(",");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY id");

        let mut conn = self.pool.acquire().await?;
        let rows: Vec<QuestionRow> = query_builder
            .build_query_as()
            .fetch_all(&mut *conn)
            .await?;

        load_children(&mut conn, rows).await
    }

    async fn set_correct_option(&self, question_id: i64, choice_id: i64) -> AppResult<()> {
        let mut conn = self.pool.acquire().await?;
        upsert_correct_option(&mut conn, question_id, choice_id).await
    }

    async fn update_descriptive(&self, question_id: i64, edit: &DescriptiveEdit) -> AppResult<Question> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE questions SET text = $1, score = $2 WHERE id = $3")
            .bind(&edit.text)
            .bind(edit.score)
            .bind(question_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(question_not_found());
        }

        sqlx::query(
            r#"
            INSERT INTO reference_answers (question_id, answer)
            VALUES ($1, $2)
            ON CONFLICT (question_id) DO UPDATE SET answer = EXCLUDED.answer
            "#,
        )
        .bind(question_id)
        .bind(edit.answer.as_deref())
        .execute(&mut *tx)
        .await?;

        let question = load_one(&mut tx, question_id).await?;
        tx.commit().await?;
        Ok(question)
    }

    async fn update_multiple_options(
        &self,
        question_id: i64,
        edit: &MultipleOptionsEdit,
    ) -> AppResult<Question> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE questions SET text = $1, score = $2 WHERE id = $3")
            .bind(&edit.text)
            .bind(edit.score)
            .bind(question_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(question_not_found());
        }

        for (choice_id, text) in &edit.plan.updates {
            sqlx::query("UPDATE choices SET text = $1 WHERE id = $2 AND question_id = $3")
                .bind(text)
                .bind(choice_id)
                .bind(question_id)
                .execute(&mut *tx)
                .await?;
        }

        if !edit.plan.deletes.is_empty() {
            sqlx::query("DELETE FROM choices WHERE question_id = $1 AND id = ANY($2)")
                .bind(question_id)
                .bind(&edit.plan.deletes)
                .execute(&mut *tx)
                .await?;
        }

        for text in &edit.plan.inserts {
            sqlx::query("INSERT INTO choices (question_id, text) VALUES ($1, $2)")
                .bind(question_id)
                .bind(text)
                .execute(&mut *tx)
                .await?;
        }

        // The index refers to the final choice list, never the pre-edit one.
        let final_ids: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM choices WHERE question_id = $1 ORDER BY id")
                .bind(question_id)
                .fetch_all(&mut *tx)
                .await?;

        let correct_id = final_ids
            .get(edit.correct_index)
            .copied()
            .ok_or(AppError::IndexOutOfRange(edit.correct_index))?;
        upsert_correct_option(&mut tx, question_id, correct_id).await?;

        let question = load_one(&mut tx, question_id).await?;
        tx.commit().await?;
        Ok(question)
    }

    async fn delete(&self, quiz_id: i64, question_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1 AND quiz_id = $2")
            .bind(question_id)
            .bind(quiz_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete question: {:?}", e);
                AppError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn total_score(&self, quiz_id: i64) -> AppResult<f64> {
        let total: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(score), 0)::DOUBLE PRECISION FROM questions WHERE quiz_id = $1",
        )
        .bind(quiz_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}
