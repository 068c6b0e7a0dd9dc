// src/handlers/results.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{participant::GradeAnswersRequest, user::UserInfo},
    state::AppState,
};

/// Every question keyed by id with its reference answer or correct option.
pub async fn answer_key(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let key = state.scores.answer_key(user, quiz_id).await?;
    Ok(Json(key))
}

/// Total possible score plus one score row per participant.
pub async fn results(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let results = state.scores.results(user, quiz_id).await?;
    Ok(Json(results))
}

pub async fn participant_detail(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path((quiz_id, participant_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let detail = state
        .scores
        .participant_detail(user, quiz_id, participant_id)
        .await?;
    Ok(Json(detail))
}

/// Applies descriptive scores and correctness toggles, returns the updated answers.
pub async fn grade_participant(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path((quiz_id, participant_id)): Path<(i64, i64)>,
    Json(payload): Json<GradeAnswersRequest>,
) -> Result<impl IntoResponse, AppError> {
    let detail = state
        .grading
        .grade(user, quiz_id, participant_id, payload)
        .await?;
    Ok(Json(detail))
}
