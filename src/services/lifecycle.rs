// src/services/lifecycle.rs
//
// Quiz state machine rules. Pure functions over a loaded quiz; the services
// run them before touching the store.

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::quiz::{Quiz, QuizSettingsPatch, SettingsChanges},
    utils::slug::slugify,
};

const PATH_MIN_LEN: usize = 7;
const PATH_MAX_LEN: usize = 30;
const TITLE_MIN_LEN: usize = 3;
const TITLE_MAX_LEN: usize = 200;

/// Draft → Active guard. `question_count` is the number of questions the quiz owns.
pub fn validate_activation(quiz: &Quiz, question_count: i64) -> AppResult<()> {
    match (quiz.start_at, quiz.end_at) {
        (Some(start_at), Some(end_at)) if start_at < end_at => {}
        (Some(_), Some(_)) => {
            return Err(AppError::Validation(
                "start_at must be earlier than end_at".to_string(),
            ));
        }
        _ => {
            return Err(AppError::Validation(
                "start_at and end_at must be set before activation".to_string(),
            ));
        }
    }

    if question_count < 1 {
        return Err(AppError::Validation(
            "quiz must have at least one question".to_string(),
        ));
    }

    if quiz.need_password && quiz.password.is_none() {
        return Err(AppError::Validation(
            "quiz requires a password but none is set".to_string(),
        ));
    }

    Ok(())
}

pub fn check_schedule(quiz: &Quiz, now: DateTime<Utc>) -> AppResult<()> {
    if quiz.start_at.is_some_and(|start_at| now < start_at) {
        return Err(AppError::NotStarted);
    }
    if quiz.end_at.is_some_and(|end_at| now > end_at) {
        return Err(AppError::Ended);
    }
    Ok(())
}

/// Schedule first, then the activation flag.
pub fn check_published_accessible(quiz: &Quiz, now: DateTime<Utc>) -> AppResult<()> {
    check_schedule(quiz, now)?;
    if !quiz.is_active {
        return Err(AppError::NotActive);
    }
    Ok(())
}

/// Quiz passwords are low-stakes join codes compared verbatim.
pub fn check_password(quiz: &Quiz, entered: Option<&str>) -> AppResult<()> {
    let Some(stored) = quiz.password.as_deref().filter(|_| quiz.need_password) else {
        return Ok(());
    };

    if entered == Some(stored) {
        Ok(())
    } else {
        Err(AppError::WrongPassword)
    }
}

/// Validates a sparse settings patch into the changes to persist.
///
/// A half window (only one of `start_at` / `end_at`) is dropped entirely.
pub fn normalize_settings(patch: QuizSettingsPatch, now: DateTime<Utc>) -> AppResult<SettingsChanges> {
    let mut changes = SettingsChanges {
        shuffle_options: patch.shuffle_options,
        ..Default::default()
    };

    if let Some(title) = patch.title {
        let len = title.chars().count();
        if !(TITLE_MIN_LEN..=TITLE_MAX_LEN).contains(&len) {
            return Err(AppError::Validation(format!(
                "title length must be between {TITLE_MIN_LEN} and {TITLE_MAX_LEN} characters"
            )));
        }
        changes.title = Some(title);
    }

    match (patch.start_at, patch.end_at) {
        (Some(start_at), Some(end_at)) => {
            if start_at > end_at {
                return Err(AppError::Validation(
                    "start_at must not be later than end_at".to_string(),
                ));
            }
            if start_at < now || end_at < now {
                return Err(AppError::Validation(
                    "quiz dates must be in the future".to_string(),
                ));
            }
            changes.window = Some((start_at, end_at));
        }
        (Some(_), None) | (None, Some(_)) => {
            tracing::warn!("Ignoring half schedule window in settings patch");
        }
        (None, None) => {}
    }

    if let Some(path) = patch.quiz_path {
        let path = slugify(&path);
        let len = path.chars().count();
        if !(PATH_MIN_LEN..=PATH_MAX_LEN).contains(&len) {
            return Err(AppError::Validation(format!(
                "quiz path length must be between {PATH_MIN_LEN} and {PATH_MAX_LEN} characters"
            )));
        }
        changes.quiz_path = Some(path);
    }

    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn draft() -> Quiz {
        let now = Utc::now();
        Quiz {
            id: 1,
            title: "Ownership".to_string(),
            owner_id: 1,
            start_at: Some(now - Duration::hours(1)),
            end_at: Some(now + Duration::hours(1)),
            is_active: false,
            password: None,
            need_password: false,
            shuffle_options: false,
            quiz_path: "ownership".to_string(),
        }
    }

    #[test]
    fn test_activation_requires_window_questions_and_password() {
        let quiz = draft();
        assert!(validate_activation(&quiz, 1).is_ok());
        assert!(matches!(
            validate_activation(&quiz, 0),
            Err(AppError::Validation(_))
        ));

        let mut reversed = draft();
        reversed.end_at = reversed.start_at;
        assert!(validate_activation(&reversed, 3).is_err());

        let mut unscheduled = draft();
        unscheduled.start_at = None;
        assert!(validate_activation(&unscheduled, 3).is_err());

        let mut locked = draft();
        locked.need_password = true;
        assert!(validate_activation(&locked, 3).is_err());
        locked.password = Some("join".to_string());
        assert!(validate_activation(&locked, 3).is_ok());
    }

    #[test]
    fn test_schedule_bounds_are_independent() {
        let now = Utc::now();
        let mut quiz = draft();
        quiz.start_at = Some(now + Duration::minutes(5));
        quiz.end_at = None;
        assert!(matches!(check_schedule(&quiz, now), Err(AppError::NotStarted)));

        quiz.start_at = None;
        quiz.end_at = Some(now - Duration::minutes(5));
        assert!(matches!(check_schedule(&quiz, now), Err(AppError::Ended)));

        quiz.end_at = None;
        assert!(check_schedule(&quiz, now).is_ok());
    }

    #[test]
    fn test_published_access_checks_schedule_before_activation() {
        let now = Utc::now();
        let mut quiz = draft();
        assert!(matches!(
            check_published_accessible(&quiz, now),
            Err(AppError::NotActive)
        ));

        quiz.end_at = Some(now - Duration::minutes(1));
        assert!(matches!(
            check_published_accessible(&quiz, now),
            Err(AppError::Ended)
        ));

        let mut active = draft();
        active.is_active = true;
        assert!(check_published_accessible(&active, now).is_ok());
    }

    #[test]
    fn test_password_gate() {
        let mut quiz = draft();
        quiz.password = Some("open-sesame".to_string());
        assert!(check_password(&quiz, None).is_ok());

        quiz.need_password = true;
        assert!(check_password(&quiz, Some("open-sesame")).is_ok());
        assert!(matches!(
            check_password(&quiz, Some("Open-Sesame")),
            Err(AppError::WrongPassword)
        ));
        assert!(check_password(&quiz, None).is_err());

        quiz.password = None;
        assert!(check_password(&quiz, None).is_ok());
    }

    #[test]
    fn test_half_window_is_dropped() {
        let now = Utc::now();
        let patch = QuizSettingsPatch {
            start_at: Some(now + Duration::hours(1)),
            ..Default::default()
        };
        let changes = normalize_settings(patch, now).unwrap();
        assert_eq!(changes.window, None);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_window_ordering_and_future_dates() {
        let now = Utc::now();
        let reversed = QuizSettingsPatch {
            start_at: Some(now + Duration::hours(2)),
            end_at: Some(now + Duration::hours(1)),
            ..Default::default()
        };
        assert!(normalize_settings(reversed, now).is_err());

        let past = QuizSettingsPatch {
            start_at: Some(now - Duration::hours(2)),
            end_at: Some(now + Duration::hours(1)),
            ..Default::default()
        };
        assert!(normalize_settings(past, now).is_err());

        let start_at = now + Duration::hours(1);
        let end_at = now + Duration::hours(2);
        let valid = QuizSettingsPatch {
            start_at: Some(start_at),
            end_at: Some(end_at),
            ..Default::default()
        };
        assert_eq!(
            normalize_settings(valid, now).unwrap().window,
            Some((start_at, end_at))
        );
    }

    #[test]
    fn test_path_is_slugified_and_bounded() {
        let now = Utc::now();
        let patch = QuizSettingsPatch {
            quiz_path: Some("Rust Basics 101".to_string()),
            ..Default::default()
        };
        assert_eq!(
            normalize_settings(patch, now).unwrap().quiz_path.as_deref(),
            Some("rust-basics-101")
        );

        let short = QuizSettingsPatch {
            quiz_path: Some("abc".to_string()),
            ..Default::default()
        };
        assert!(normalize_settings(short, now).is_err());
    }
}
