// src/handlers/auth.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::{
    error::AppError,
    models::user::{LoginRequest, RefreshRequest, RegisterRequest, SendCodeRequest, UserInfo},
    state::AppState,
};

/// Sends a one-time registration code to the given e-mail.
///
/// Returns 202 Accepted; delivery happens in the background.
pub async fn send_code(
    State(state): State<AppState>,
    Json(payload): Json<SendCodeRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.auth.send_verify_code(payload).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "message": "verification code sent" })),
    ))
}

/// Registers a new user after checking the verification code.
///
/// Returns 201 Created and the user object (excluding password).
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.auth.register(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticates a user and returns an access/refresh token pair.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tokens = state.auth.login(payload).await?;
    Ok(Json(tokens))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tokens = state.auth.refresh(payload).await?;
    Ok(Json(tokens))
}

/// Current user's profile.
pub async fn profile(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.auth.profile(user).await?;
    Ok(Json(user))
}
