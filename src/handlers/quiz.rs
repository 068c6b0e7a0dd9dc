// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use crate::{
    error::AppError,
    models::{
        quiz::{CreateQuizRequest, QuizSettingsPatch, SetPasswordRequest},
        user::UserInfo,
    },
    state::AppState,
};

/// Creates a draft quiz with a generated path.
pub async fn create_quiz(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = state.quizzes.create(user, payload).await?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

/// Lists the caller's quizzes with their question counts.
pub async fn list_quizzes(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
) -> Result<impl IntoResponse, AppError> {
    let quizzes = state.quizzes.list(user).await?;
    Ok(Json(quizzes))
}

/// Settings view of a single quiz.
pub async fn get_quiz(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = state.quizzes.get(user, id).await?;
    Ok(Json(quiz))
}

pub async fn update_settings(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<i64>,
    Json(payload): Json<QuizSettingsPatch>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = state
        .quizzes
        .update_settings(user, id, payload, Utc::now())
        .await?;
    Ok(Json(quiz))
}

pub async fn delete_quiz(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.quizzes.delete(user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_password(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<i64>,
    Json(payload): Json<SetPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = state.quizzes.set_password(user, id, payload).await?;
    Ok(Json(quiz))
}

/// Flips the quiz between Draft and Active.
pub async fn toggle_activation(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let status = state.quizzes.toggle_activation(user, id).await?;
    Ok(Json(status))
}
