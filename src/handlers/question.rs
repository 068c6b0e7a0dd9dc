// src/handlers/question.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{
        question::{
            CreateDescriptiveRequest, CreateMultipleOptionsRequest, QuestionType,
            SetCorrectOptionRequest, UpdateDescriptiveRequest, UpdateMultipleOptionsRequest,
        },
        user::UserInfo,
    },
    state::AppState,
};

/// Owner view: every question with its reference answer, choices and correct option.
pub async fn list_questions(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let questions = state.questions.list(user, quiz_id).await?;
    Ok(Json(questions))
}

pub async fn create_descriptive_short(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<CreateDescriptiveRequest>,
) -> Result<impl IntoResponse, AppError> {
    let question = state
        .questions
        .create_descriptive(user, quiz_id, QuestionType::DescriptiveShort, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(question)))
}

pub async fn create_descriptive_long(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<CreateDescriptiveRequest>,
) -> Result<impl IntoResponse, AppError> {
    let question = state
        .questions
        .create_descriptive(user, quiz_id, QuestionType::DescriptiveLong, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(question)))
}

/// Creates the question, its choices and the correct option in one go.
pub async fn create_multiple_options(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<CreateMultipleOptionsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let question = state
        .questions
        .create_multiple_options(user, quiz_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(question)))
}

pub async fn update_descriptive(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path((quiz_id, question_id)): Path<(i64, i64)>,
    Json(payload): Json<UpdateDescriptiveRequest>,
) -> Result<impl IntoResponse, AppError> {
    let question = state
        .questions
        .update_descriptive(user, quiz_id, question_id, payload)
        .await?;
    Ok(Json(question))
}

/// Reconciles the choice list by id, then points the correct option into the result.
pub async fn update_multiple_options(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path((quiz_id, question_id)): Path<(i64, i64)>,
    Json(payload): Json<UpdateMultipleOptionsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let question = state
        .questions
        .update_multiple_options(user, quiz_id, question_id, payload)
        .await?;
    Ok(Json(question))
}

pub async fn set_correct_option(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path((quiz_id, question_id)): Path<(i64, i64)>,
    Json(payload): Json<SetCorrectOptionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let question = state
        .questions
        .set_correct_option(user, quiz_id, question_id, payload.choice_id)
        .await?;
    Ok(Json(question))
}

pub async fn delete_question(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path((quiz_id, question_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    state.questions.delete(user, quiz_id, question_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
