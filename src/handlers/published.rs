// src/handlers/published.rs
//
// Participant-facing endpoints. No authentication; access is gated by the
// quiz's schedule, activation flag and optional password.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use crate::{
    error::AppError,
    models::{participant::SubmitAnswersRequest, quiz::EnterPasswordRequest},
    state::AppState,
};

pub async fn password_status(
    State(state): State<AppState>,
    Path(quiz_path): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let status = state
        .quizzes
        .password_status(&quiz_path, Utc::now())
        .await?;
    Ok(Json(status))
}

pub async fn published_questions(
    State(state): State<AppState>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<EnterPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = state
        .quizzes
        .published_questions(quiz_id, payload.password.as_deref(), Utc::now())
        .await?;
    Ok(Json(quiz))
}

pub async fn submit_answers(
    State(state): State<AppState>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<SubmitAnswersRequest>,
) -> Result<impl IntoResponse, AppError> {
    let receipt = state
        .submissions
        .submit(quiz_id, payload, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}
