// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Global Application Error Enum.
/// Centralizes the failure taxonomy of the quiz engine and its mapping to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    // 500 Internal Server Error
    #[error("internal server error: {0}")]
    InternalServerError(String),

    // 400 Bad Request: malformed or inconsistent input caught before any write
    #[error("{0}")]
    Validation(String),

    // 401 Unauthorized
    #[error("{0}")]
    Unauthorized(String),

    // 403 Forbidden: not owner/admin, or wrong quiz password
    #[error("{0}")]
    Forbidden(String),

    // 404 Not Found
    #[error("{0}")]
    NotFound(String),

    // 409 Conflict (e.g., duplicate quiz path or e-mail)
    #[error("{0}")]
    Conflict(String),

    // 429 Too Many Requests
    #[error("{0}")]
    TooManyRequests(String),

    // 403 Forbidden: wrong quiz join code
    #[error("wrong quiz password")]
    WrongPassword,

    #[error("quiz has not started yet")]
    NotStarted,

    #[error("quiz is over")]
    Ended,

    #[error("quiz is not active")]
    NotActive,

    #[error("question missing from answer")]
    QuestionMissing,

    /// Carries the offending choice id.
    #[error("{0}")]
    WrongOption(i64),

    #[error("correct option index {0} is out of range")]
    IndexOutOfRange(usize),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Stable machine-readable code rendered next to the message.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::InternalServerError(_) => "internal_error",
            AppError::Validation(_) => "validation_error",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::TooManyRequests(_) => "too_many_requests",
            AppError::WrongPassword => "wrong_quiz_password",
            AppError::NotStarted => "quiz_not_started",
            AppError::Ended => "quiz_ended",
            AppError::NotActive => "quiz_not_activated",
            AppError::QuestionMissing => "question_missing",
            AppError::WrongOption(_) => "wrong_option_id",
            AppError::IndexOutOfRange(_) => "correct_answer_index_out_of_range",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) | AppError::WrongPassword => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Validation(_)
            | AppError::NotStarted
            | AppError::Ended
            | AppError::NotActive
            | AppError::QuestionMissing
            | AppError::WrongOption(_)
            | AppError::IndexOutOfRange(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match &self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };
        let body = Json(json!({
            "error": error_message,
            "type": self.error_type(),
        }));

        (status, body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError`.
/// Unique violations become `Conflict`, everything else is internal.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return AppError::Conflict(db_err.message().to_string());
            }
        }
        AppError::InternalServerError(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(err.to_string())
    }
}
