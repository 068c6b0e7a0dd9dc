// src/services/access.rs

use crate::{
    error::{AppError, AppResult},
    models::{quiz::Quiz, user::UserInfo},
    repositories::QuizRepository,
};

/// What a policy gets to look at.
pub struct PolicyContext<'a> {
    pub user: UserInfo,
    pub quiz: &'a Quiz,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    Allow,
    Deny(String),
}

pub type Policy = fn(&PolicyContext<'_>) -> PolicyDecision;

pub fn is_admin(ctx: &PolicyContext<'_>) -> PolicyDecision {
    if ctx.user.is_admin {
        PolicyDecision::Allow
    } else {
        PolicyDecision::Deny("caller is not an admin".to_string())
    }
}

pub fn is_quiz_owner(ctx: &PolicyContext<'_>) -> PolicyDecision {
    if ctx.quiz.owner_id == ctx.user.user_id {
        PolicyDecision::Allow
    } else {
        PolicyDecision::Deny("caller does not own this quiz".to_string())
    }
}

/// Policies guarding every owner-side quiz operation.
pub const QUIZ_OWNER_POLICIES: &[Policy] = &[is_admin, is_quiz_owner];

/// Allows on the first policy that allows; otherwise forbidden with the last reason.
pub fn access_control(policies: &[Policy], ctx: &PolicyContext<'_>) -> AppResult<()> {
    let mut reason = "access denied".to_string();
    for policy in policies {
        match policy(ctx) {
            PolicyDecision::Allow => return Ok(()),
            PolicyDecision::Deny(why) => reason = why,
        }
    }
    Err(AppError::Forbidden(reason))
}

/// Loads a quiz and runs the owner policies against it.
pub async fn authorize_quiz(
    quizzes: &dyn QuizRepository,
    user: UserInfo,
    quiz_id: i64,
) -> AppResult<Quiz> {
    let quiz = quizzes
        .find_by_id(quiz_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

    access_control(QUIZ_OWNER_POLICIES, &PolicyContext { user, quiz: &quiz }).inspect_err(|_| {
        tracing::warn!(user_id = user.user_id, quiz_id, "Quiz access denied");
    })?;

    Ok(quiz)
}
